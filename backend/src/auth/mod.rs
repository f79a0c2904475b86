//! Token signing, password hashing, and secret fingerprinting.

pub mod fingerprint;
pub mod password;
pub mod token;

pub use fingerprint::secret_fingerprint;
pub use password::{PasswordHashError, hash_password, verify_password};
pub use token::{Claims, TokenError, TokenService, from_url_form, to_url_form};
