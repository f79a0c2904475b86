//! Bearer-token authentication helpers used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! token checks and user identity derivation here.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::TokenError;
use crate::domain::ports::UserRepository;
use crate::domain::{Error, Role, User, UserId};

use super::error::map_user_store_error;
use super::state::HttpState;

/// Identity asserted by a verified access token.
///
/// The role here is whatever the token was issued with. Authorisation
/// decisions must consult the store via [`require_admin`] because the stored
/// role may have changed since the token was signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    claimed_role: Role,
}

impl AuthContext {
    /// Identifier of the authenticated account.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Role recorded in the token at issue time.
    #[must_use]
    pub fn claimed_role(&self) -> Role {
        self.claimed_role
    }

    fn extract(req: &HttpRequest) -> Result<Self, Error> {
        let state = req
            .app_data::<web::Data<HttpState>>()
            .ok_or_else(|| Error::internal("http state not configured"))?;
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
        let claims = state.tokens.verify(token).map_err(|error| match error {
            TokenError::Expired => Error::unauthorized("token has expired"),
            _ => Error::unauthorized("token is invalid"),
        })?;
        Ok(Self {
            user_id: claims.user_id(),
            claimed_role: claims.role,
        })
    }
}

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract(req).map_err(Into::into))
    }
}

/// Load the authenticated account from the store.
///
/// Returns `401 Unauthorized` when the account behind a still-valid token has
/// been deleted.
pub async fn current_user(auth: &AuthContext, users: &dyn UserRepository) -> Result<User, Error> {
    users
        .find_by_id(auth.user_id())
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::unauthorized("account no longer exists"))
}

/// Load the authenticated account and require its stored role to be admin.
///
/// The role claim inside the token is deliberately ignored: a demotion takes
/// effect on the next request, not at the next token refresh.
pub async fn require_admin(auth: &AuthContext, users: &dyn UserRepository) -> Result<User, Error> {
    let user = current_user(auth, users).await?;
    if user.role().is_admin() {
        Ok(user)
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}
