//! Notification handlers: admin fan-out, per-user listing, read flags.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Error;
use crate::domain::notification::{NotificationView, RecipientParseError, RecipientSpec};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthContext, current_user, require_admin};
use crate::inbound::http::error::map_notification_store_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_recipients_error;

/// Notification send request body. `email` is the raw recipient field: the
/// all-clients alias or a comma-separated address list.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub email: String,
    pub message: String,
}

/// Number of notification rows a send call produced.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationResponse {
    pub created_count: u32,
}

/// Fan a message out to the requested recipients.
///
/// Admin only. The whole batch is one transaction: an unresolvable explicit
/// address creates no rows at all.
#[utoipa::path(
    post,
    path = "/api/v1/manual-notification/create",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notifications created", body = CreateNotificationResponse),
        (status = 400, description = "Invalid recipients or empty message", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "A recipient email matched no account", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "createNotification"
)]
#[post("/manual-notification/create")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let sender = require_admin(&auth, state.users.as_ref()).await?;
    let payload = payload.into_inner();

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(Error::invalid_request("message must not be empty"));
    }
    let recipients = RecipientSpec::parse(&payload.email).map_err(|error| match error {
        RecipientParseError::Empty => invalid_recipients_error("recipient list must not be empty"),
        RecipientParseError::InvalidAddress { address } => {
            invalid_recipients_error(format!("invalid recipient address: {address}"))
        }
    })?;

    let created_count = state
        .notifications
        .create_batch(sender.id(), &recipients, message)
        .await
        .map_err(map_notification_store_error)?;
    info!(sender_id = %sender.id(), created_count, "notification batch created");
    Ok(HttpResponse::Created().json(CreateNotificationResponse { created_count }))
}

/// List every notification the caller sent or received.
#[utoipa::path(
    get,
    path = "/api/v1/manual-notification",
    responses(
        (status = 200, description = "Notifications involving the caller", body = [NotificationView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/manual-notification")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<NotificationView>>> {
    let user = current_user(&auth, state.users.as_ref()).await?;
    let views = state
        .notifications
        .list_for(user.id())
        .await
        .map_err(map_notification_store_error)?;
    Ok(web::Json(views))
}

/// Read-flag update request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub is_read: bool,
}

/// Set or clear the read flag on one notification.
///
/// Only the recipient may flip the flag; the sender gets a 403 like anyone
/// else.
#[utoipa::path(
    put,
    path = "/api/v1/manual-notification/{id}/read",
    params(("id" = i64, Path, description = "Notification id")),
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Flag updated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not the recipient", body = Error),
        (status = 404, description = "No such notification", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[put("/manual-notification/{id}/read")]
pub async fn mark_notification_read(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<i64>,
    payload: web::Json<MarkReadRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&auth, state.users.as_ref()).await?;
    state
        .notifications
        .mark_read(path.into_inner(), user.id(), payload.is_read)
        .await
        .map_err(map_notification_store_error)?;
    Ok(HttpResponse::Ok().finish())
}
