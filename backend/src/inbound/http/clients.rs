//! Client account handlers: registration, sessions, password lifecycle,
//! profile management, and role flips.
//!
//! ```text
//! POST /api/v1/client/register {"firstName":"Ana","lastName":"Silva",...}
//! POST /api/v1/client/login {"email":"ana@example.pt","password":"..."}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{
    TokenError, hash_password, to_url_form, from_url_form, verify_password,
};
use crate::domain::auth::{LoginCredentials, RawPassword};
use crate::domain::user::{
    EmailAddress, NewUser, PersonName, PhoneNumber, ProfileUpdate, TaxId, User,
};
use crate::domain::{Error, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthContext, current_user, require_admin};
use crate::inbound::http::error::map_user_store_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_credentials_error, map_password_error, map_user_field_error,
};

/// Public view of an account, sans password hash.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub nif: String,
    pub role: Role,
}

impl From<&User> for ClientDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().get(),
            first_name: user.first_name().as_ref().to_owned(),
            last_name: user.last_name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            phone_number: user.phone_number().as_ref().to_owned(),
            nif: user.nif().as_ref().to_owned(),
            role: user.role(),
        }
    }
}

/// Access/refresh token pair issued at registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: ClientDto,
}

fn map_token_error(error: TokenError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

fn issue_token_pair(state: &HttpState, user: &User) -> Result<TokenPairResponse, Error> {
    let token = state
        .tokens
        .issue_access(user.id(), user.role())
        .map_err(map_token_error)?;
    let refresh = state
        .tokens
        .issue_refresh(user.id(), user.role())
        .map_err(map_token_error)?;
    Ok(TokenPairResponse {
        token,
        refresh_token: refresh,
        user: ClientDto::from(user),
    })
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub nif: String,
}

/// Register a new account and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/client/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenPairResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["clients"],
    operation_id = "register",
    security([])
)]
#[post("/client/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let first_name = PersonName::new(payload.first_name)
        .map_err(|e| map_user_field_error(FieldName::new("firstName"), &e))?;
    let last_name = PersonName::new(payload.last_name)
        .map_err(|e| map_user_field_error(FieldName::new("lastName"), &e))?;
    let email = EmailAddress::new(payload.email)
        .map_err(|e| map_user_field_error(FieldName::new("email"), &e))?;
    let phone_number = PhoneNumber::new(payload.phone_number)
        .map_err(|e| map_user_field_error(FieldName::new("phoneNumber"), &e))?;
    let nif = TaxId::new(payload.nif)
        .map_err(|e| map_user_field_error(FieldName::new("nif"), &e))?;
    let password = RawPassword::new(payload.password)
        .map_err(|e| map_password_error(FieldName::new("password"), &e))?;
    let password_hash =
        hash_password(&password).map_err(|e| Error::internal(e.to_string()))?;

    let user = state
        .users
        .insert(NewUser {
            first_name,
            last_name,
            email,
            phone_number,
            nif,
            password_hash,
            role: Role::Regular,
        })
        .await
        .map_err(map_user_store_error)?;

    info!(user_id = %user.id(), "account registered");
    let pair = issue_token_pair(&state, &user)?;
    Ok(HttpResponse::Created().json(pair))
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verify credentials and return a fresh token pair.
#[utoipa::path(
    post,
    path = "/api/v1/client/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenPairResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["clients"],
    operation_id = "login",
    security([])
)]
#[post("/client/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(payload.email, payload.password)
        .map_err(|e| map_credentials_error(&e))?;

    // Unknown email and wrong password produce the same response so the
    // endpoint cannot be used to enumerate accounts.
    let user = state
        .users
        .find_by_email(credentials.email())
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
    if !verify_password(user.password_hash(), credentials.password()) {
        return Err(Error::unauthorized("invalid credentials"));
    }

    let pair = issue_token_pair(&state, &user)?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Acknowledge a logout.
///
/// Tokens are stateless and not persisted, so there is nothing to revoke;
/// clients discard their pair and the tokens age out at expiry.
#[utoipa::path(
    post,
    path = "/api/v1/client/logout",
    responses(
        (status = 200, description = "Logout acknowledged"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["clients"],
    operation_id = "logout"
)]
#[post("/client/logout")]
pub async fn logout(auth: AuthContext) -> ApiResult<HttpResponse> {
    info!(user_id = %auth.user_id(), "logout acknowledged");
    Ok(HttpResponse::Ok().finish())
}

/// Refresh request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Fresh access token minted from a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
}

/// Mint a new access token from a valid refresh token.
///
/// The account is re-read from the store so the new token carries the
/// current role, not the role at refresh-token issue time.
#[utoipa::path(
    post,
    path = "/api/v1/client/refresh-token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Refresh token rejected", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["clients"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/client/refresh-token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> ApiResult<HttpResponse> {
    let claims = state
        .tokens
        .verify(&payload.refresh_token)
        .map_err(|error| match error {
            TokenError::Expired => Error::unauthorized("refresh token has expired"),
            _ => Error::unauthorized("refresh token is invalid"),
        })?;
    let user = state
        .users
        .find_by_id(claims.user_id())
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
    let token = state
        .tokens
        .issue_access(user.id(), user.role())
        .map_err(map_token_error)?;
    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// Password recovery request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoverPasswordRequest {
    pub email: String,
}

/// Reset token issued by password recovery, in URL-substituted form.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoverPasswordResponse {
    pub reset_token: String,
}

/// Issue a 24 hour reset token, mail the reset link, and return the token.
///
/// The token is returned in the response as well as mailed, so recovery does
/// not depend on SMTP delivery; a mail failure is logged, never surfaced.
#[utoipa::path(
    post,
    path = "/api/v1/client/recover-password",
    request_body = RecoverPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued", body = RecoverPasswordResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No account with this email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["clients"],
    operation_id = "recoverPassword",
    security([])
)]
#[post("/client/recover-password")]
pub async fn recover_password(
    state: web::Data<HttpState>,
    payload: web::Json<RecoverPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let email = EmailAddress::new(payload.into_inner().email)
        .map_err(|e| map_user_field_error(FieldName::new("email"), &e))?;
    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::not_found("no account with this email"))?;

    let reset_token = to_url_form(
        &state
            .tokens
            .issue_reset(user.id(), user.role())
            .map_err(map_token_error)?,
    );
    let reset_url = format!("{}/{reset_token}", state.reset_url_base);
    if let Err(error) = state.mailer.send_password_reset(user.email(), &reset_url).await {
        warn!(user_id = %user.id(), %error, "reset mail dispatch failed");
    }

    Ok(HttpResponse::Ok().json(RecoverPasswordResponse { reset_token }))
}

/// Password reset request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub new_password: String,
}

/// Consume a reset token and overwrite the password hash.
///
/// Accepts the token in URL-substituted or canonical form. Tokens are not
/// tracked once used, so a token can be replayed until it expires.
#[utoipa::path(
    post,
    path = "/api/v1/client/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Reset token rejected", body = Error),
        (status = 404, description = "Account gone", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["clients"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/client/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let claims = state
        .tokens
        .verify(&from_url_form(&payload.reset_token))
        .map_err(|error| match error {
            TokenError::Expired => Error::unauthorized("reset token has expired"),
            _ => Error::unauthorized("reset token is invalid"),
        })?;
    let new_password = RawPassword::new(payload.new_password)
        .map_err(|e| map_password_error(FieldName::new("newPassword"), &e))?;

    let user = state
        .users
        .find_by_id(claims.user_id())
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::not_found("user not found"))?;
    let password_hash =
        hash_password(&new_password).map_err(|e| Error::internal(e.to_string()))?;
    state
        .users
        .update_password(user.id(), password_hash)
        .await
        .map_err(map_user_store_error)?;

    info!(user_id = %user.id(), "password reset consumed");
    Ok(HttpResponse::Ok().finish())
}

/// Password change request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Replace the caller's password after verifying the current one.
#[utoipa::path(
    put,
    path = "/api/v1/client/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised or wrong current password", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["clients"],
    operation_id = "changePassword"
)]
#[put("/client/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let new_password = RawPassword::new(payload.new_password)
        .map_err(|e| map_password_error(FieldName::new("newPassword"), &e))?;

    let user = current_user(&auth, state.users.as_ref()).await?;
    let current = RawPassword::new(payload.current_password)
        .map_err(|_| Error::unauthorized("current password is incorrect"))?;
    if !verify_password(user.password_hash(), &current) {
        return Err(Error::unauthorized("current password is incorrect"));
    }

    let password_hash =
        hash_password(&new_password).map_err(|e| Error::internal(e.to_string()))?;
    state
        .users
        .update_password(user.id(), password_hash)
        .await
        .map_err(map_user_store_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// Read the caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/client",
    responses(
        (status = 200, description = "Own profile", body = ClientDto),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["clients"],
    operation_id = "getProfile"
)]
#[get("/client")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<ClientDto>> {
    let user = current_user(&auth, state.users.as_ref()).await?;
    Ok(web::Json(ClientDto::from(&user)))
}

/// Profile update request body. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Update the caller's names and phone number.
///
/// Email and role are deliberately immutable here: email anchors uniqueness
/// and roles only change through the explicit flip endpoints.
#[utoipa::path(
    put,
    path = "/api/v1/client",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ClientDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["clients"],
    operation_id = "updateProfile"
)]
#[put("/client")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ClientDto>> {
    let payload = payload.into_inner();
    let update = ProfileUpdate {
        first_name: payload
            .first_name
            .map(PersonName::new)
            .transpose()
            .map_err(|e| map_user_field_error(FieldName::new("firstName"), &e))?,
        last_name: payload
            .last_name
            .map(PersonName::new)
            .transpose()
            .map_err(|e| map_user_field_error(FieldName::new("lastName"), &e))?,
        phone_number: payload
            .phone_number
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|e| map_user_field_error(FieldName::new("phoneNumber"), &e))?,
    };
    if update.is_empty() {
        return Err(Error::invalid_request("no profile fields to update"));
    }

    let user = current_user(&auth, state.users.as_ref()).await?;
    state
        .users
        .update_profile(user.id(), update)
        .await
        .map_err(map_user_store_error)?;
    let user = current_user(&auth, state.users.as_ref()).await?;
    Ok(web::Json(ClientDto::from(&user)))
}

async fn delete_own_account(state: &HttpState, auth: &AuthContext) -> Result<HttpResponse, Error> {
    let user = current_user(auth, state.users.as_ref()).await?;
    state
        .users
        .delete(user.id())
        .await
        .map_err(map_user_store_error)?;
    info!(user_id = %user.id(), "account deleted");
    Ok(HttpResponse::Ok().finish())
}

/// Delete the caller's own account.
#[utoipa::path(
    delete,
    path = "/api/v1/client/delete",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["clients"],
    operation_id = "deleteAccount"
)]
#[delete("/client/delete")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<HttpResponse> {
    delete_own_account(&state, &auth).await
}

/// POST alias kept for clients that cannot issue DELETE requests.
#[utoipa::path(
    post,
    path = "/api/v1/client/delete",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["clients"],
    operation_id = "deleteAccountPost"
)]
#[post("/client/delete")]
pub async fn delete_account_post(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<HttpResponse> {
    delete_own_account(&state, &auth).await
}

/// List every registered account.
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses(
        (status = 200, description = "All accounts", body = [ClientDto]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["clients"],
    operation_id = "listClients"
)]
#[get("/clients")]
pub async fn list_clients(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<ClientDto>>> {
    current_user(&auth, state.users.as_ref()).await?;
    let users = state.users.list_all().await.map_err(map_user_store_error)?;
    Ok(web::Json(users.iter().map(ClientDto::from).collect()))
}

/// Role flip request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub email: String,
}

async fn flip_role(
    state: &HttpState,
    auth: &AuthContext,
    target_email: String,
    role: Role,
) -> Result<HttpResponse, Error> {
    let admin = require_admin(auth, state.users.as_ref()).await?;
    let email = EmailAddress::new(target_email)
        .map_err(|e| map_user_field_error(FieldName::new("email"), &e))?;
    let target = state
        .users
        .find_by_email(&email)
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::not_found("no account with this email"))?;
    state
        .users
        .set_role(target.id(), role)
        .await
        .map_err(map_user_store_error)?;
    info!(
        admin_id = %admin.id(),
        target_id = %target.id(),
        role = %role,
        "role changed"
    );
    Ok(HttpResponse::Ok().finish())
}

/// Promote the account behind an email to admin.
#[utoipa::path(
    post,
    path = "/api/v1/client/admin",
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role changed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "No account with this email", body = Error)
    ),
    tags = ["clients"],
    operation_id = "promoteToAdmin"
)]
#[post("/client/admin")]
pub async fn promote_to_admin(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<RoleChangeRequest>,
) -> ApiResult<HttpResponse> {
    flip_role(&state, &auth, payload.into_inner().email, Role::Admin).await
}

/// Demote the account behind an email to regular.
#[utoipa::path(
    post,
    path = "/api/v1/client/regular",
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role changed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "No account with this email", body = Error)
    ),
    tags = ["clients"],
    operation_id = "demoteToRegular"
)]
#[post("/client/regular")]
pub async fn demote_to_regular(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<RoleChangeRequest>,
) -> ApiResult<HttpResponse> {
    flip_role(&state, &auth, payload.into_inner().email, Role::Regular).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::test_support::{TEST_PASSWORD, TestBackend};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn test_app(
        backend: &TestBackend,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(backend.state()))
            .service(web::scope("/api/v1").configure(crate::inbound::http::api_services))
    }

    fn register_body(email: &str) -> Value {
        json!({
            "firstName": "Ana",
            "lastName": "Silva",
            "email": email,
            "password": "secret-password",
            "phoneNumber": "912345678",
            "nif": "123456789",
        })
    }

    #[actix_web::test]
    async fn register_returns_tokens_and_profile() {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/register")
            .set_json(register_body("ana@example.pt"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body.get("token").is_some());
        assert!(body.get("refreshToken").is_some());
        assert_eq!(body["user"]["email"], "ana@example.pt");
        assert_eq!(body["user"]["role"], "regular");

        let token = body["token"].as_str().expect("token string");
        let claims = backend.tokens.verify(token).expect("valid token");
        assert_eq!(claims.sub, body["user"]["id"].as_i64().expect("user id"));
    }

    #[actix_web::test]
    async fn duplicate_email_registration_conflicts_without_second_row() {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(&backend)).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = actix_test::TestRequest::post()
                .uri("/api/v1/client/register")
                .set_json(register_body("dup@example.pt"))
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }

        let users = backend.users.list_all().await.expect("list users");
        assert_eq!(users.len(), 1);
    }

    #[rstest]
    #[case(json!({"firstName": "", "lastName": "S", "email": "a@b.pt", "password": "secret-1", "phoneNumber": "912345678", "nif": "123456789"}), "firstName")]
    #[case(json!({"firstName": "A", "lastName": "S", "email": "nope", "password": "secret-1", "phoneNumber": "912345678", "nif": "123456789"}), "email")]
    #[case(json!({"firstName": "A", "lastName": "S", "email": "a@b.pt", "password": "secret-1", "phoneNumber": "91234", "nif": "123456789"}), "phoneNumber")]
    #[case(json!({"firstName": "A", "lastName": "S", "email": "a@b.pt", "password": "secret-1", "phoneNumber": "912345678", "nif": "12"}), "nif")]
    #[case(json!({"firstName": "A", "lastName": "S", "email": "a@b.pt", "password": "shrt", "phoneNumber": "912345678", "nif": "123456789"}), "password")]
    #[actix_web::test]
    async fn register_reports_the_offending_field(#[case] body: Value, #[case] field: &str) {
        let backend = TestBackend::new();
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/register")
            .set_json(body)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn login_round_trips_subject_and_role() {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/login")
            .set_json(json!({"email": user.email().as_ref(), "password": TEST_PASSWORD}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = actix_test::read_body_json(resp).await;
        let claims = backend
            .tokens
            .verify(body["token"].as_str().expect("token"))
            .expect("valid token");
        assert_eq!(claims.user_id(), user.id());
        assert_eq!(claims.role, user.role());
    }

    #[rstest]
    #[case("rui.silva@example.pt", "wrong-password")]
    #[case("nobody@example.pt", "password123")]
    #[actix_web::test]
    async fn login_rejects_bad_credentials_uniformly(
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let backend = TestBackend::new();
        backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/login")
            .set_json(json!({"email": email, "password": password}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "invalid credentials");
    }

    #[actix_web::test]
    async fn refresh_token_mints_a_verifiable_access_token() {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let refresh = backend
            .tokens
            .issue_refresh(user.id(), user.role())
            .expect("refresh token");
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/refresh-token")
            .set_json(json!({"refreshToken": refresh}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = actix_test::read_body_json(resp).await;
        let claims = backend
            .tokens
            .verify(body["token"].as_str().expect("token"))
            .expect("valid access token");
        assert_eq!(claims.user_id(), user.id());
        assert_eq!(claims.role, user.role());
    }

    #[actix_web::test]
    async fn refresh_reflects_a_role_change_in_the_new_token() {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let refresh = backend
            .tokens
            .issue_refresh(user.id(), user.role())
            .expect("refresh token");
        backend
            .users
            .set_role(user.id(), Role::Admin)
            .await
            .expect("promote");
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/refresh-token")
            .set_json(json!({"refreshToken": refresh}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let body: Value = actix_test::read_body_json(resp).await;
        let claims = backend
            .tokens
            .verify(body["token"].as_str().expect("token"))
            .expect("valid access token");
        assert_eq!(claims.role, Role::Admin);
    }

    #[actix_web::test]
    async fn role_flip_requires_a_stored_admin() {
        let backend = TestBackend::new();
        let regular = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        // Forged claim: the token says admin, the store says regular.
        let forged = backend
            .tokens
            .issue_access(regular.id(), Role::Admin)
            .expect("token");
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/client/admin")
            .insert_header(("Authorization", format!("Bearer {forged}")))
            .set_json(json!({"email": regular.email().as_ref()}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admins_flip_roles_both_ways() {
        let backend = TestBackend::new();
        let admin = backend.seed_admin().await;
        let regular = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        for (uri, expected_role) in [
            ("/api/v1/client/admin", Role::Admin),
            ("/api/v1/client/regular", Role::Regular),
        ] {
            let req = actix_test::TestRequest::post()
                .uri(uri)
                .insert_header(("Authorization", backend.bearer(&admin)))
                .set_json(json!({"email": regular.email().as_ref()}))
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let stored = backend
                .users
                .find_by_id(regular.id())
                .await
                .expect("lookup")
                .expect("still present");
            assert_eq!(stored.role(), expected_role);
        }
    }

    #[actix_web::test]
    async fn profile_update_changes_only_submitted_fields() {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::put()
            .uri("/api/v1/client")
            .insert_header(("Authorization", backend.bearer(&user)))
            .set_json(json!({"firstName": "Mariana"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["firstName"], "Mariana");
        assert_eq!(body["lastName"], user.last_name().as_ref());
        assert_eq!(body["email"], user.email().as_ref());
    }

    #[actix_web::test]
    async fn empty_profile_update_is_rejected() {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::put()
            .uri("/api/v1/client")
            .insert_header(("Authorization", backend.bearer(&user)))
            .set_json(json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case("DELETE")]
    #[case("POST")]
    #[actix_web::test]
    async fn both_delete_routes_remove_the_account(#[case] method: &str) {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = match method {
            "DELETE" => actix_test::TestRequest::delete(),
            _ => actix_test::TestRequest::post(),
        }
        .uri("/api/v1/client/delete")
        .insert_header(("Authorization", backend.bearer(&user)))
        .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            backend
                .users
                .find_by_id(user.id())
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[actix_web::test]
    async fn change_password_requires_the_current_one() {
        let backend = TestBackend::new();
        let user = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::put()
            .uri("/api/v1/client/password")
            .insert_header(("Authorization", backend.bearer(&user)))
            .set_json(json!({"currentPassword": "not-the-password", "newPassword": "next-password"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::put()
            .uri("/api/v1/client/password")
            .insert_header(("Authorization", backend.bearer(&user)))
            .set_json(json!({"currentPassword": TEST_PASSWORD, "newPassword": "next-password"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = backend
            .users
            .find_by_id(user.id())
            .await
            .expect("lookup")
            .expect("present");
        let new_password = RawPassword::new("next-password").expect("valid password");
        assert!(verify_password(stored.password_hash(), &new_password));
    }

    #[actix_web::test]
    async fn list_clients_requires_auth_and_returns_everyone() {
        let backend = TestBackend::new();
        let admin = backend.seed_admin().await;
        backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/clients").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/clients")
            .insert_header(("Authorization", backend.bearer(&admin)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body.as_array().expect("array").len(), 2);
    }
}
