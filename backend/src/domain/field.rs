//! Sports field reference records.

use std::fmt;

/// Maximum length accepted for a field name.
pub const FIELD_NAME_MAX: usize = 80;

/// Validation failures for field payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "field name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "field name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for FieldValidationError {}

/// A bookable court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: i64,
    pub name: String,
    pub available: bool,
}

/// Payload for creating or replacing a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub available: bool,
}

impl FieldSpec {
    /// Validate and construct a field payload.
    pub fn new(name: impl Into<String>, available: bool) -> Result<Self, FieldValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FieldValidationError::EmptyName);
        }
        if trimmed.chars().count() > FIELD_NAME_MAX {
            return Err(FieldValidationError::NameTooLong {
                max: FIELD_NAME_MAX,
            });
        }
        Ok(Self {
            name: trimmed.to_owned(),
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn trims_and_accepts_names() {
        let spec = FieldSpec::new("  Court 1  ", true).expect("valid spec");
        assert_eq!(spec.name, "Court 1");
        assert!(spec.available);
    }

    #[rstest]
    fn rejects_blank_and_overlong_names() {
        assert_eq!(
            FieldSpec::new("   ", true).expect_err("blank"),
            FieldValidationError::EmptyName
        );
        let overlong = "x".repeat(FIELD_NAME_MAX + 1);
        assert_eq!(
            FieldSpec::new(overlong, false).expect_err("overlong"),
            FieldValidationError::NameTooLong {
                max: FIELD_NAME_MAX
            }
        );
    }
}
