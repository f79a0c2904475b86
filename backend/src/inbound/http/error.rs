//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. Port errors from the outbound adapters are translated here as well
//! so every handler maps store failures the same way.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::ports::{
    FieldPersistenceError, NotificationPersistenceError, PricePersistenceError,
    ReservationPersistenceError, UserPersistenceError,
};
use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::{TRACE_ID_HEADER, TraceId};

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wire envelope for failed requests.
///
/// ## Invariants
/// - Internal errors are redacted: the body never carries the original
///   message or details, only a generic line. The original message is logged
///   together with the trace identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ErrorBody {
    /// Build the envelope for a domain error, capturing any ambient trace
    /// identifier.
    fn capture(error: &Error) -> Self {
        let trace_id = TraceId::current().map(|id| id.to_string());
        let (message, details) = if matches!(error.code(), ErrorCode::InternalError) {
            ("Internal server error".to_owned(), None)
        } else {
            (error.message().to_owned(), error.details().cloned())
        };
        Self {
            code: error.code(),
            message,
            trace_id,
            details,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message as shown to the client.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier propagated into the response header.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary structured details.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorBody::capture(self);
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(
                trace_id = body.trace_id().unwrap_or(""),
                message = %self.message(),
                "internal error redacted from response"
            );
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = body.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(body)
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn store_unavailable(store: &'static str, message: &str) -> Error {
    error!(store, error = %message, "store connection failed");
    Error::service_unavailable("service temporarily unavailable")
}

/// Map credential-store failures onto transport errors.
pub(crate) fn map_user_store_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => store_unavailable("users", &message),
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store query failed: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email already registered: {email}"))
        }
        UserPersistenceError::NotFound => Error::not_found("user not found"),
    }
}

/// Map notification-store failures onto transport errors.
pub(crate) fn map_notification_store_error(error: NotificationPersistenceError) -> Error {
    match error {
        NotificationPersistenceError::Connection { message } => {
            store_unavailable("notifications", &message)
        }
        NotificationPersistenceError::Query { message } => {
            Error::internal(format!("notification store query failed: {message}"))
        }
        NotificationPersistenceError::RecipientNotFound { email } => {
            Error::not_found(format!("recipient not found: {email}"))
        }
        NotificationPersistenceError::NotFound => Error::not_found("notification not found"),
        NotificationPersistenceError::NotRecipient => {
            Error::forbidden("only the recipient may update the read flag")
        }
    }
}

/// Map field-store failures onto transport errors.
pub(crate) fn map_field_store_error(error: FieldPersistenceError) -> Error {
    match error {
        FieldPersistenceError::Connection { message } => store_unavailable("fields", &message),
        FieldPersistenceError::Query { message } => {
            Error::internal(format!("field store query failed: {message}"))
        }
        FieldPersistenceError::NotFound => Error::not_found("field not found"),
    }
}

/// Map price-store failures onto transport errors.
pub(crate) fn map_price_store_error(error: PricePersistenceError) -> Error {
    match error {
        PricePersistenceError::Connection { message } => store_unavailable("prices", &message),
        PricePersistenceError::Query { message } => {
            Error::internal(format!("price store query failed: {message}"))
        }
        PricePersistenceError::NotFound => Error::not_found("price not found"),
    }
}

/// Map reservation-store failures onto transport errors.
pub(crate) fn map_reservation_store_error(error: ReservationPersistenceError) -> Error {
    match error {
        ReservationPersistenceError::Connection { message } => {
            store_unavailable("reservations", &message)
        }
        ReservationPersistenceError::Query { message } => {
            Error::internal(format!("reservation store query failed: {message}"))
        }
        ReservationPersistenceError::NotFound => Error::not_found("reservation not found"),
        ReservationPersistenceError::FieldNotFound { field_id } => {
            Error::not_found(format!("field {field_id} not found"))
        }
        ReservationPersistenceError::PriceNotFound { price_id } => {
            Error::not_found(format!("price {price_id} not found"))
        }
        ReservationPersistenceError::FieldUnavailable { field_id } => {
            Error::conflict(format!("field {field_id} is not available"))
        }
        ReservationPersistenceError::SlotTaken => {
            Error::conflict("field is already reserved for this time")
        }
        ReservationPersistenceError::NotOwner => {
            Error::forbidden("only the reservation owner may change it")
        }
    }
}
