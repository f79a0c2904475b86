//! Password hashing and verification.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::domain::auth::RawPassword;

/// Hashing failed before a PHC string could be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(pub String);

/// Hash a password into a salted Argon2id PHC string.
pub fn hash_password(plain: &RawPassword) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| PasswordHashError(error.to_string()))
}

/// Verify a password against a stored PHC string.
///
/// An unparseable stored hash verifies as false.
#[must_use]
pub fn verify_password(hash: &str, plain: &RawPassword) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.expose().as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn password(plain: &str) -> RawPassword {
        RawPassword::new(plain).expect("valid password")
    }

    #[rstest]
    fn hash_then_verify_round_trips() {
        let hash = hash_password(&password("correct-horse")).expect("hash");
        assert!(verify_password(&hash, &password("correct-horse")));
        assert!(!verify_password(&hash, &password("battery-staple")));
    }

    #[rstest]
    fn hashes_are_salted() {
        let first = hash_password(&password("correct-horse")).expect("hash");
        let second = hash_password(&password("correct-horse")).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn hash_is_a_phc_argon2id_string() {
        let hash = hash_password(&password("correct-horse")).expect("hash");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[rstest]
    #[case("")]
    #[case("plainly-not-a-hash")]
    #[case("$argon2id$broken")]
    fn unparseable_stored_hash_never_verifies(#[case] stored: &str) {
        assert!(!verify_password(stored, &password("whatever-pass")));
    }
}
