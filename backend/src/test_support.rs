//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`): in-memory port implementations, a
//! recording mailer, and a pre-wired [`TestBackend`] that assembles them
//! into an [`HttpState`].

pub mod memory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{hash_password, TokenService};
use crate::domain::auth::RawPassword;
use crate::domain::ports::{Mailer, MailerError, UserRepository};
use crate::domain::user::{EmailAddress, NewUser, PersonName, PhoneNumber, TaxId, User};
use crate::domain::Role;
use crate::inbound::http::state::HttpState;

pub use memory::{
    InMemoryFields, InMemoryNotifications, InMemoryPrices, InMemoryReservations, InMemoryUsers,
};

/// Signing secret used by every test token service.
pub const TEST_TOKEN_SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

/// Recovery-link base used by every test state.
pub const TEST_RESET_URL_BASE: &str = "http://localhost:3000/reset-password";

/// Password every seeded account is created with.
pub const TEST_PASSWORD: &str = "password123";

/// A password-recovery mail captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMail {
    pub to: String,
    pub reset_url: String,
}

/// Mailer double that records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<RecordedMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    /// A mailer whose every send fails with a transport error.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<RecordedMail> {
        self.sent.lock().expect("mailer record lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(
        &self,
        to: &EmailAddress,
        reset_url: &str,
    ) -> Result<(), MailerError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(MailerError::transport("recording mailer set to fail"));
        }
        self.sent.lock().expect("mailer record lock").push(RecordedMail {
            to: to.as_ref().to_owned(),
            reset_url: reset_url.to_owned(),
        });
        Ok(())
    }
}

/// Pre-wired in-memory backend for handler tests.
///
/// Keeps the concrete adapter handles alongside the trait objects so tests
/// can seed rows and inspect the recording mailer directly.
pub struct TestBackend {
    pub users: Arc<InMemoryUsers>,
    pub notifications: Arc<InMemoryNotifications>,
    pub fields: Arc<InMemoryFields>,
    pub prices: Arc<InMemoryPrices>,
    pub reservations: Arc<InMemoryReservations>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: Arc<TokenService>,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    /// Backend whose mailer rejects every send.
    pub fn with_failing_mailer() -> Self {
        Self::with_mailer(RecordingMailer::failing())
    }

    fn with_mailer(mailer: RecordingMailer) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let fields = Arc::new(InMemoryFields::default());
        let prices = Arc::new(InMemoryPrices::default());
        let notifications = Arc::new(InMemoryNotifications::new(users.clone()));
        let reservations = Arc::new(InMemoryReservations::new(
            users.clone(),
            fields.clone(),
            prices.clone(),
        ));
        users.cascade_into(&notifications, &reservations);
        fields.cascade_into(&reservations);
        Self {
            users,
            notifications,
            fields,
            prices,
            reservations,
            mailer: Arc::new(mailer),
            tokens: Arc::new(TokenService::new(TEST_TOKEN_SECRET)),
        }
    }

    /// Handler state backed by this backend's adapters.
    pub fn state(&self) -> HttpState {
        HttpState {
            users: self.users.clone(),
            notifications: self.notifications.clone(),
            fields: self.fields.clone(),
            prices: self.prices.clone(),
            reservations: self.reservations.clone(),
            mailer: self.mailer.clone(),
            tokens: self.tokens.clone(),
            reset_url_base: TEST_RESET_URL_BASE.to_owned(),
        }
    }

    /// Insert an account with [`TEST_PASSWORD`] hashed for storage.
    pub async fn seed_user(&self, first: &str, last: &str, email: &str, role: Role) -> User {
        let raw = RawPassword::new(TEST_PASSWORD).expect("test password");
        let password_hash = hash_password(&raw).expect("test hash");
        let new_user = NewUser {
            first_name: PersonName::new(first).expect("test name"),
            last_name: PersonName::new(last).expect("test name"),
            email: EmailAddress::new(email).expect("test email"),
            phone_number: PhoneNumber::new("912345678").expect("test phone"),
            nif: TaxId::new("123456789").expect("test nif"),
            password_hash,
            role,
        };
        self.users.insert(new_user).await.expect("seed user")
    }

    pub async fn seed_admin(&self) -> User {
        self.seed_user("Alice", "Admin", "alice.admin@example.pt", Role::Admin)
            .await
    }

    pub async fn seed_regular(&self) -> User {
        self.seed_user("Rui", "Silva", "rui.silva@example.pt", Role::Regular)
            .await
    }

    /// Access token for a seeded account.
    pub fn access_token(&self, user: &User) -> String {
        self.tokens
            .issue_access(user.id(), user.role())
            .expect("test token")
    }

    /// `Authorization` header value for a seeded account.
    pub fn bearer(&self, user: &User) -> String {
        format!("Bearer {}", self.access_token(user))
    }
}

/// Empty in-memory HTTP state with a deterministic token secret.
pub fn test_state() -> HttpState {
    TestBackend::new().state()
}

/// State pre-seeded with one admin and one regular account, in that order.
pub async fn seeded_state() -> (HttpState, Vec<User>) {
    let backend = TestBackend::new();
    let admin = backend.seed_admin().await;
    let regular = backend.seed_regular().await;
    (backend.state(), vec![admin, regular])
}
