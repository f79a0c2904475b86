//! User data model and the validated field newtypes it is built from.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Validation errors returned by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidEmail,
    InvalidPhoneNumber,
    InvalidTaxId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::InvalidPhoneNumber => write!(f, "phone number must be exactly 9 digits"),
            Self::InvalidTaxId => write!(f, "tax identifier must be exactly 9 digits"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable numeric user identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Access the raw identifier.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Maximum allowed length for a first or last name.
pub const NAME_MAX: usize = 60;

/// A non-empty first or last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a name from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Mailbox shape check only; deliverability is the relay's problem.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// A syntactically valid, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an address from owned input.
    ///
    /// Addresses are lowercased so the store's uniqueness constraint is
    /// case-insensitive in practice.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into().trim().to_lowercase();
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn exactly_nine_digits(value: &str) -> bool {
    value.len() == 9 && value.bytes().all(|b| b.is_ascii_digit())
}

/// A nine-digit phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a phone number from owned input.
    pub fn new(number: impl Into<String>) -> Result<Self, UserValidationError> {
        let number = number.into();
        if !exactly_nine_digits(number.trim()) {
            return Err(UserValidationError::InvalidPhoneNumber);
        }
        Ok(Self(number.trim().to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A nine-digit tax identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxId(String);

impl TaxId {
    /// Validate and construct a tax identifier from owned input.
    pub fn new(nif: impl Into<String>) -> Result<Self, UserValidationError> {
        let nif = nif.into();
        if !exactly_nine_digits(nif.trim()) {
            return Err(UserValidationError::InvalidTaxId);
        }
        Ok(Self(nif.trim().to_owned()))
    }
}

impl AsRef<str> for TaxId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<TaxId> for String {
    fn from(value: TaxId) -> Self {
        value.0
    }
}

impl TryFrom<String> for TaxId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A registered account as the credential store holds it.
///
/// The password hash never leaves the domain; response DTOs are built from
/// the accessor methods and omit it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    first_name: PersonName,
    last_name: PersonName,
    email: EmailAddress,
    phone_number: PhoneNumber,
    nif: TaxId,
    password_hash: String,
    role: Role,
}

impl User {
    /// Assemble a user from already-validated parts.
    #[must_use]
    pub fn new(
        id: UserId,
        first_name: PersonName,
        last_name: PersonName,
        email: EmailAddress,
        phone_number: PhoneNumber,
        nif: TaxId,
        password_hash: String,
        role: Role,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            phone_number,
            nif,
            password_hash,
            role,
        }
    }

    /// Stable identifier assigned by the store.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// First name.
    #[must_use]
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Last name.
    #[must_use]
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Unique email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Contact phone number.
    #[must_use]
    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    /// Tax identifier.
    #[must_use]
    pub fn nif(&self) -> &TaxId {
        &self.nif
    }

    /// Stored password hash (PHC string).
    #[must_use]
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Current permission level.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Concatenated first and last name for display contexts.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A not-yet-persisted account produced by registration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub nif: TaxId,
    pub password_hash: String,
    pub role: Role,
}

/// Partial profile change applied to an existing account.
///
/// Absent fields are left untouched; email and role have their own dedicated
/// operations and cannot change here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub phone_number: Option<PhoneNumber>,
}

impl ProfileUpdate {
    /// Whether the update carries no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone_number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ana@example.com")]
    #[case("ANA@Example.COM")]
    #[case("  a.b+c@sub.domain.pt ")]
    fn accepts_and_lowercases_valid_emails(#[case] raw: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), raw.trim().to_lowercase());
    }

    #[rstest]
    #[case("")]
    #[case("plainaddress")]
    #[case("@no-local.pt")]
    #[case("no-domain@")]
    #[case("spaces in@example.com")]
    #[case("no-tld@example")]
    fn rejects_invalid_emails(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw).expect_err("should fail"),
            UserValidationError::InvalidEmail
        );
    }

    #[rstest]
    #[case("912345678")]
    #[case(" 912345678 ")]
    fn accepts_nine_digit_phone_numbers(#[case] raw: &str) {
        let phone = PhoneNumber::new(raw).expect("valid phone");
        assert_eq!(phone.as_ref(), "912345678");
    }

    #[rstest]
    #[case("12345678")]
    #[case("1234567890")]
    #[case("91234567a")]
    #[case("")]
    fn rejects_malformed_phone_numbers(#[case] raw: &str) {
        assert_eq!(
            PhoneNumber::new(raw).expect_err("should fail"),
            UserValidationError::InvalidPhoneNumber
        );
    }

    #[rstest]
    fn rejects_malformed_tax_ids() {
        assert_eq!(
            TaxId::new("12345").expect_err("should fail"),
            UserValidationError::InvalidTaxId
        );
        assert!(TaxId::new("123456789").is_ok());
    }

    #[rstest]
    fn person_name_trims_and_bounds_input() {
        let name = PersonName::new("  Ana  ").expect("valid name");
        assert_eq!(name.as_ref(), "Ana");
        assert_eq!(
            PersonName::new("   ").expect_err("empty"),
            UserValidationError::EmptyName
        );
        let overlong = "x".repeat(NAME_MAX + 1);
        assert_eq!(
            PersonName::new(overlong).expect_err("too long"),
            UserValidationError::NameTooLong { max: NAME_MAX }
        );
    }

    #[rstest]
    fn display_name_joins_first_and_last() {
        let user = User::new(
            UserId(7),
            PersonName::new("Ana").expect("first"),
            PersonName::new("Silva").expect("last"),
            EmailAddress::new("ana@example.com").expect("email"),
            PhoneNumber::new("912345678").expect("phone"),
            TaxId::new("123456789").expect("nif"),
            "$argon2id$stub".into(),
            Role::Regular,
        );
        assert_eq!(user.display_name(), "Ana Silva");
    }

    #[rstest]
    fn profile_update_default_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            phone_number: Some(PhoneNumber::new("912345678").expect("phone")),
            ..ProfileUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
