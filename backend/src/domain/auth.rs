//! Login credentials and plaintext password handling.
//!
//! Plaintext passwords are wrapped in [`zeroize::Zeroizing`] so the memory is
//! cleared when the value drops, and never appear in debug output.

use std::fmt;

use zeroize::Zeroizing;

use super::user::EmailAddress;

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length.
pub const PASSWORD_MAX: usize = 40;

/// Validation errors raised while constructing credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    InvalidEmail,
    PasswordTooShort { min: usize },
    PasswordTooLong { max: usize },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// A length-checked plaintext password, zeroed on drop.
pub struct RawPassword(Zeroizing<String>);

impl RawPassword {
    /// Validate and wrap a plaintext password.
    pub fn new(password: impl Into<String>) -> Result<Self, CredentialsValidationError> {
        let password = Zeroizing::new(password.into());
        let length = password.chars().count();
        if length < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(password))
    }

    /// Borrow the plaintext for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword(***)")
    }
}

/// Email and password pair presented at login.
#[derive(Debug)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: RawPassword,
}

impl LoginCredentials {
    /// Validate both parts and assemble credentials.
    pub fn try_from_parts(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsValidationError> {
        let email =
            EmailAddress::new(email).map_err(|_| CredentialsValidationError::InvalidEmail)?;
        let password = RawPassword::new(password)?;
        Ok(Self { email, password })
    }

    /// The address the caller claims to own.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The plaintext password to verify.
    #[must_use]
    pub fn password(&self) -> &RawPassword {
        &self.password
    }
}
