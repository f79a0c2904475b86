//! Usage statistics handlers over trailing windows.

use actix_web::{get, web};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::ports::UsageCount;
use crate::domain::reservation::StatPeriod;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthContext, current_user};
use crate::inbound::http::error::map_reservation_store_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_reservation_error;

/// A statistics row: a label and how many reservations backed it.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageCountDto {
    pub label: String,
    pub count: i64,
}

impl From<UsageCount> for UsageCountDto {
    fn from(usage: UsageCount) -> Self {
        Self {
            label: usage.label,
            count: usage.count,
        }
    }
}

fn window_start(raw_period: &str) -> Result<NaiveDateTime, Error> {
    let period = StatPeriod::parse(raw_period).map_err(|e| map_reservation_error(&e))?;
    Ok(period.window_start(Utc::now().naive_utc()))
}

/// The most reserved field over a trailing period.
#[utoipa::path(
    get,
    path = "/api/v1/statistics/frequent-field/{period}",
    params(("period" = String, Path, description = "Trailing window: 1week, 1month, or 1year")),
    responses(
        (status = 200, description = "Most reserved field", body = UsageCountDto),
        (status = 400, description = "Unknown period", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No reservations in the window", body = Error)
    ),
    tags = ["statistics"],
    operation_id = "frequentField"
)]
#[get("/statistics/frequent-field/{period}")]
pub async fn frequent_field(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UsageCountDto>> {
    current_user(&auth, state.users.as_ref()).await?;
    let since = window_start(&path.into_inner())?;
    let usage = state
        .reservations
        .most_reserved_field(since)
        .await
        .map_err(map_reservation_store_error)?
        .ok_or_else(|| Error::not_found("no reservations in this period"))?;
    Ok(web::Json(UsageCountDto::from(usage)))
}

/// The most frequent start slot over a trailing period.
#[utoipa::path(
    get,
    path = "/api/v1/statistics/frequent-time/{period}",
    params(("period" = String, Path, description = "Trailing window: 1week, 1month, or 1year")),
    responses(
        (status = 200, description = "Most frequent start slot", body = UsageCountDto),
        (status = 400, description = "Unknown period", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No reservations in the window", body = Error)
    ),
    tags = ["statistics"],
    operation_id = "frequentTime"
)]
#[get("/statistics/frequent-time/{period}")]
pub async fn frequent_time(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UsageCountDto>> {
    current_user(&auth, state.users.as_ref()).await?;
    let since = window_start(&path.into_inner())?;
    let usage = state
        .reservations
        .most_frequent_start(since)
        .await
        .map_err(map_reservation_store_error)?
        .ok_or_else(|| Error::not_found("no reservations in this period"))?;
    Ok(web::Json(UsageCountDto::from(usage)))
}
