//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers translate domain validation failures into per-field error
//! payloads here so every endpoint reports `details: {field, code}` the same
//! way.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::json;

use crate::domain::Error;
use crate::domain::auth::CredentialsValidationError;
use crate::domain::field::FieldValidationError;
use crate::domain::price::PriceValidationError;
use crate::domain::reservation::ReservationValidationError;
use crate::domain::user::UserValidationError;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    EmptyName,
    NameTooLong,
    InvalidEmail,
    InvalidPhoneNumber,
    InvalidNif,
    PasswordTooShort,
    PasswordTooLong,
    InvalidPriceType,
    NonPositivePrice,
    InvalidDate,
    InvalidTime,
    InvalidTimestamp,
    InvalidTimeRange,
    InvalidPeriod,
    InvalidWindow,
    InvalidRecipients,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyName => "empty_name",
            ErrorCode::NameTooLong => "name_too_long",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidPhoneNumber => "invalid_phone_number",
            ErrorCode::InvalidNif => "invalid_nif",
            ErrorCode::PasswordTooShort => "password_too_short",
            ErrorCode::PasswordTooLong => "password_too_long",
            ErrorCode::InvalidPriceType => "invalid_price_type",
            ErrorCode::NonPositivePrice => "non_positive_price",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidTimeRange => "invalid_time_range",
            ErrorCode::InvalidPeriod => "invalid_period",
            ErrorCode::InvalidWindow => "invalid_window",
            ErrorCode::InvalidRecipients => "invalid_recipients",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Map a user-field validation failure for the named request field.
pub(crate) fn map_user_field_error(field: FieldName, error: &UserValidationError) -> Error {
    let name = field.as_str();
    match error {
        UserValidationError::EmptyName => {
            ValidationError::new(name, format!("{name} must not be empty"))
                .with_code(ErrorCode::EmptyName)
        }
        UserValidationError::NameTooLong { max } => {
            ValidationError::new(name, format!("{name} must be at most {max} characters"))
                .with_code(ErrorCode::NameTooLong)
        }
        UserValidationError::InvalidEmail => {
            ValidationError::new(name, format!("{name} must be a valid email address"))
                .with_code(ErrorCode::InvalidEmail)
        }
        UserValidationError::InvalidPhoneNumber => {
            ValidationError::new(name, format!("{name} must be exactly nine digits"))
                .with_code(ErrorCode::InvalidPhoneNumber)
        }
        UserValidationError::InvalidTaxId => {
            ValidationError::new(name, format!("{name} must be exactly nine digits"))
                .with_code(ErrorCode::InvalidNif)
        }
    }
}

/// Map a credentials validation failure onto the conventional field names.
pub(crate) fn map_credentials_error(error: &CredentialsValidationError) -> Error {
    match error {
        CredentialsValidationError::InvalidEmail => {
            ValidationError::new("email", "email must be a valid email address")
                .with_code(ErrorCode::InvalidEmail)
        }
        CredentialsValidationError::PasswordTooShort { min } => ValidationError::new(
            "password",
            format!("password must be at least {min} characters"),
        )
        .with_code(ErrorCode::PasswordTooShort),
        CredentialsValidationError::PasswordTooLong { max } => ValidationError::new(
            "password",
            format!("password must be at most {max} characters"),
        )
        .with_code(ErrorCode::PasswordTooLong),
    }
}

/// Map a password validation failure for a named field such as `newPassword`.
pub(crate) fn map_password_error(field: FieldName, error: &CredentialsValidationError) -> Error {
    let name = field.as_str();
    match error {
        CredentialsValidationError::PasswordTooShort { min } => {
            ValidationError::new(name, format!("{name} must be at least {min} characters"))
                .with_code(ErrorCode::PasswordTooShort)
        }
        CredentialsValidationError::PasswordTooLong { max } => {
            ValidationError::new(name, format!("{name} must be at most {max} characters"))
                .with_code(ErrorCode::PasswordTooLong)
        }
        CredentialsValidationError::InvalidEmail => {
            ValidationError::new(name, format!("{name} is not valid"))
                .with_code(ErrorCode::InvalidEmail)
        }
    }
}

/// Map a field (pitch) validation failure.
pub(crate) fn map_field_spec_error(error: &FieldValidationError) -> Error {
    match error {
        FieldValidationError::EmptyName => {
            ValidationError::new("name", "name must not be empty").with_code(ErrorCode::EmptyName)
        }
        FieldValidationError::NameTooLong { max } => {
            ValidationError::new("name", format!("name must be at most {max} characters"))
                .with_code(ErrorCode::NameTooLong)
        }
    }
}

/// Map a price validation failure.
pub(crate) fn map_price_spec_error(error: &PriceValidationError) -> Error {
    match error {
        PriceValidationError::InvalidType { value } => ValidationError::new(
            "priceType",
            "priceType must match the weekday/weekend time-band pattern",
        )
        .with_value(ErrorCode::InvalidPriceType, value.clone()),
        PriceValidationError::NonPositiveValue { value } => {
            ValidationError::new("priceValue", "priceValue must be greater than zero")
                .with_value(ErrorCode::NonPositivePrice, value.to_string())
        }
    }
}

pub(crate) fn invalid_recipients_error(message: impl Into<String>) -> Error {
    ValidationError::new("email", message).with_code(ErrorCode::InvalidRecipients)
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    let name = field.as_str();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(name, format!("{name} must be a YYYY-MM-DD date"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    let name = field.as_str();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            ValidationError::new(name, format!("{name} must be an HH:MM time"))
                .with_value(ErrorCode::InvalidTime, value)
        })
}

pub(crate) fn parse_timestamp(value: &str, field: FieldName) -> Result<NaiveDateTime, Error> {
    let name = field.as_str();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map_err(|_| {
        ValidationError::new(
            name,
            format!("{name} must be a YYYY-MM-DD HH:MM:SS timestamp"),
        )
        .with_value(ErrorCode::InvalidTimestamp, value)
    })
}

/// Map a reservation validation failure raised while assembling a request.
pub(crate) fn map_reservation_error(error: &ReservationValidationError) -> Error {
    match error {
        ReservationValidationError::EndNotAfterStart => {
            ValidationError::new("endTime", "endTime must be after initialTime")
                .with_code(ErrorCode::InvalidTimeRange)
        }
        ReservationValidationError::InvalidPeriod { value } => {
            ValidationError::new("period", "period must be one of 1week, 1month, 1year")
                .with_value(ErrorCode::InvalidPeriod, value.clone())
        }
        ReservationValidationError::InvalidWindow { kind, value } => {
            ValidationError::new("window", format!("{kind} window value is not valid"))
                .with_value(ErrorCode::InvalidWindow, value.clone())
        }
    }
}
