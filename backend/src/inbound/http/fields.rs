//! Field reference-data handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Error;
use crate::domain::field::{Field, FieldSpec};
use crate::domain::reservation::CalendarWindow;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthContext, current_user, require_admin};
use crate::inbound::http::error::{map_field_store_error, map_reservation_store_error};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_field_spec_error, map_reservation_error};

/// Wire form of a bookable court.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDto {
    pub id: i64,
    pub name: String,
    pub available: bool,
}

impl From<Field> for FieldDto {
    fn from(field: Field) -> Self {
        Self {
            id: field.id,
            name: field.name,
            available: field.available,
        }
    }
}

/// Field create/update request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
    pub name: String,
    pub available: bool,
}

impl FieldRequest {
    fn into_spec(self) -> Result<FieldSpec, Error> {
        FieldSpec::new(self.name, self.available).map_err(|e| map_field_spec_error(&e))
    }
}

/// List every field.
#[utoipa::path(
    get,
    path = "/api/v1/fields",
    responses(
        (status = 200, description = "All fields", body = [FieldDto]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["fields"],
    operation_id = "listFields"
)]
#[get("/fields")]
pub async fn list_fields(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<FieldDto>>> {
    current_user(&auth, state.users.as_ref()).await?;
    let fields = state.fields.list().await.map_err(map_field_store_error)?;
    Ok(web::Json(fields.into_iter().map(FieldDto::from).collect()))
}

/// Create a field. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/fields/create",
    request_body = FieldRequest,
    responses(
        (status = 201, description = "Field created", body = FieldDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["fields"],
    operation_id = "createField"
)]
#[post("/fields/create")]
pub async fn create_field(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<FieldRequest>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&auth, state.users.as_ref()).await?;
    let spec = payload.into_inner().into_spec()?;
    let field = state
        .fields
        .create(spec)
        .await
        .map_err(map_field_store_error)?;
    info!(admin_id = %admin.id(), field_id = field.id, "field created");
    Ok(HttpResponse::Created().json(FieldDto::from(field)))
}

/// Replace a field's name and availability. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/fields/{id}/update",
    params(("id" = i64, Path, description = "Field id")),
    request_body = FieldRequest,
    responses(
        (status = 200, description = "Field updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "No such field", body = Error)
    ),
    tags = ["fields"],
    operation_id = "updateField"
)]
#[put("/fields/{id}/update")]
pub async fn update_field(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<i64>,
    payload: web::Json<FieldRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&auth, state.users.as_ref()).await?;
    let spec = payload.into_inner().into_spec()?;
    state
        .fields
        .update(path.into_inner(), spec)
        .await
        .map_err(map_field_store_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// Delete a field. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/fields/{id}/delete",
    params(("id" = i64, Path, description = "Field id")),
    responses(
        (status = 200, description = "Field deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "No such field", body = Error)
    ),
    tags = ["fields"],
    operation_id = "deleteField"
)]
#[delete("/fields/{id}/delete")]
pub async fn delete_field(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&auth, state.users.as_ref()).await?;
    let id = path.into_inner();
    state
        .fields
        .delete(id)
        .await
        .map_err(map_field_store_error)?;
    info!(admin_id = %admin.id(), field_id = id, "field deleted");
    Ok(HttpResponse::Ok().finish())
}

/// Fields with no uncancelled reservation inside a calendar window. Admin
/// only.
#[utoipa::path(
    get,
    path = "/api/v1/fields/unused/{kind}/{value}",
    params(
        ("kind" = String, Path, description = "Window kind: day, month, or year"),
        ("value" = String, Path, description = "YYYY-MM-DD, YYYY-MM, or YYYY to match the kind")
    ),
    responses(
        (status = 200, description = "Field names without reservations in the window", body = [String]),
        (status = 400, description = "Unsupported window kind or malformed value", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["fields"],
    operation_id = "unusedFields"
)]
#[get("/fields/unused/{kind}/{value}")]
pub async fn unused_fields(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<String>>> {
    require_admin(&auth, state.users.as_ref()).await?;
    let (kind, value) = path.into_inner();
    let window = CalendarWindow::parse(&kind, &value).map_err(|e| map_reservation_error(&e))?;
    let names = state
        .reservations
        .unused_fields(window)
        .await
        .map_err(map_reservation_store_error)?;
    Ok(web::Json(names))
}
