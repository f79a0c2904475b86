//! Price entries: a value attached to a weekly time slot.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation failures for price payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceValidationError {
    InvalidType { value: String },
    NonPositiveValue { value: f64 },
}

impl fmt::Display for PriceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidType { value } => {
                write!(f, "price type does not match a known slot pattern: {value}")
            }
            Self::NonPositiveValue { value } => {
                write!(f, "price value must be positive, got {value}")
            }
        }
    }
}

impl std::error::Error for PriceValidationError {}

static PRICE_TYPE_RE: OnceLock<Regex> = OnceLock::new();

fn price_type_regex() -> &'static Regex {
    PRICE_TYPE_RE.get_or_init(|| {
        // Weekday or weekend tag followed by a start and end slot, e.g.
        // SEMANA_19H30_21H00 or FIM_SEMANA_09H00_10H30.
        let pattern = r"^(FIM_SEMANA|SEMANA)_\d{2}H\d{2}_\d{2}H\d{2}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("price type regex failed to compile: {error}"))
    })
}

/// A slot descriptor such as `SEMANA_19H30_21H00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PriceType(String);

impl PriceType {
    /// Validate and construct a slot descriptor.
    pub fn new(value: impl Into<String>) -> Result<Self, PriceValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if !price_type_regex().is_match(trimmed) {
            return Err(PriceValidationError::InvalidType {
                value: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PriceType {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PriceType> for String {
    fn from(value: PriceType) -> Self {
        value.0
    }
}

impl TryFrom<String> for PriceType {
    type Error = PriceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A persisted price entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub id: i64,
    pub price_value: f64,
    pub price_type: PriceType,
    pub start_time: NaiveDate,
    pub is_active: bool,
}

/// Payload for creating or replacing a price entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSpec {
    pub price_value: f64,
    pub price_type: PriceType,
    pub start_time: NaiveDate,
    pub is_active: bool,
}

impl PriceSpec {
    /// Validate and construct a price payload.
    pub fn new(
        price_value: f64,
        price_type: PriceType,
        start_time: NaiveDate,
        is_active: bool,
    ) -> Result<Self, PriceValidationError> {
        if price_value <= 0.0 {
            return Err(PriceValidationError::NonPositiveValue { value: price_value });
        }
        Ok(Self {
            price_value,
            price_type,
            start_time,
            is_active,
        })
    }
}
