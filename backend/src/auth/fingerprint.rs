//! Signing-secret fingerprinting for operational visibility.
//!
//! Provides a truncated SHA-256 fingerprint of the token signing secret,
//! enabling operators to verify which secret is active without exposing the
//! key material itself. The fingerprint is logged on startup.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Generate a truncated SHA-256 fingerprint of the signing secret.
///
/// Returns the first 8 bytes of the SHA-256 hash as a 16-character hex
/// string. This is sufficient for visual distinction in logs without being
/// security-sensitive.
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    let result = hasher.finalize();
    hex::encode(&result[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_deterministic() {
        let fp1 = secret_fingerprint(b"shared-signing-secret");
        let fp2 = secret_fingerprint(b"shared-signing-secret");

        assert_eq!(fp1, fp2, "fingerprint should be deterministic");
    }

    #[rstest]
    fn fingerprint_has_correct_length() {
        let fp = secret_fingerprint(b"shared-signing-secret");

        assert_eq!(
            fp.len(),
            FINGERPRINT_BYTES * 2,
            "fingerprint should be 16 hex characters"
        );
    }

    #[rstest]
    fn fingerprint_is_lowercase_hex() {
        let fp = secret_fingerprint(b"shared-signing-secret");

        assert!(
            fp.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "fingerprint should be lowercase hex"
        );
    }

    #[rstest]
    fn different_secrets_produce_different_fingerprints() {
        let fp1 = secret_fingerprint(b"secret-a");
        let fp2 = secret_fingerprint(b"secret-b");

        assert_ne!(
            fp1, fp2,
            "different secrets should have different fingerprints"
        );
    }
}
