//! Price reference-data handlers.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Error;
use crate::domain::price::{Price, PriceSpec, PriceType};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthContext, current_user, require_admin};
use crate::inbound::http::error::map_price_store_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_price_spec_error, parse_date};

/// Wire form of a price entry.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceDto {
    pub id: i64,
    pub price_value: f64,
    pub price_type: String,
    pub start_time: NaiveDate,
    pub is_active: bool,
}

impl From<Price> for PriceDto {
    fn from(price: Price) -> Self {
        Self {
            id: price.id,
            price_value: price.price_value,
            price_type: price.price_type.to_string(),
            start_time: price.start_time,
            is_active: price.is_active,
        }
    }
}

/// Price create/update request body. `startTime` is a YYYY-MM-DD date from
/// which the entry applies.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub price_value: f64,
    pub price_type: String,
    pub start_time: String,
    pub is_active: bool,
}

impl PriceRequest {
    fn into_spec(self) -> Result<PriceSpec, Error> {
        let price_type = PriceType::new(self.price_type).map_err(|e| map_price_spec_error(&e))?;
        let start_time = parse_date(&self.start_time, FieldName::new("startTime"))?;
        PriceSpec::new(self.price_value, price_type, start_time, self.is_active)
            .map_err(|e| map_price_spec_error(&e))
    }
}

/// List every price entry.
#[utoipa::path(
    get,
    path = "/api/v1/prices",
    responses(
        (status = 200, description = "All price entries", body = [PriceDto]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["prices"],
    operation_id = "listPrices"
)]
#[get("/prices")]
pub async fn list_prices(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<PriceDto>>> {
    current_user(&auth, state.users.as_ref()).await?;
    let prices = state.prices.list().await.map_err(map_price_store_error)?;
    Ok(web::Json(prices.into_iter().map(PriceDto::from).collect()))
}

/// Create a price entry. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/prices/create",
    request_body = PriceRequest,
    responses(
        (status = 201, description = "Price created", body = PriceDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["prices"],
    operation_id = "createPrice"
)]
#[post("/prices/create")]
pub async fn create_price(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<PriceRequest>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&auth, state.users.as_ref()).await?;
    let spec = payload.into_inner().into_spec()?;
    let price = state
        .prices
        .create(spec)
        .await
        .map_err(map_price_store_error)?;
    info!(admin_id = %admin.id(), price_id = price.id, "price created");
    Ok(HttpResponse::Created().json(PriceDto::from(price)))
}

/// Replace a price entry. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/prices/{id}/update",
    params(("id" = i64, Path, description = "Price id")),
    request_body = PriceRequest,
    responses(
        (status = 200, description = "Price updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "No such price", body = Error)
    ),
    tags = ["prices"],
    operation_id = "updatePrice"
)]
#[put("/prices/{id}/update")]
pub async fn update_price(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<i64>,
    payload: web::Json<PriceRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&auth, state.users.as_ref()).await?;
    let spec = payload.into_inner().into_spec()?;
    state
        .prices
        .update(path.into_inner(), spec)
        .await
        .map_err(map_price_store_error)?;
    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PriceRepository;
    use crate::test_support::TestBackend;
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

    fn price_body() -> Value {
        json!({
            "priceValue": 17.5,
            "priceType": "SEMANA_19H30_21H00",
            "startTime": "2024-06-01",
            "isActive": true,
        })
    }

    #[actix_web::test]
    async fn create_then_update_round_trip() {
        let backend = TestBackend::new();
        let admin = backend.seed_admin().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/prices/create")
            .insert_header(("Authorization", backend.bearer(&admin)))
            .set_json(price_body())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(resp).await;
        let id = created["id"].as_i64().expect("price id");
        assert_eq!(created["priceType"], "SEMANA_19H30_21H00");

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/prices/{id}/update"))
            .insert_header(("Authorization", backend.bearer(&admin)))
            .set_json(json!({
                "priceValue": 12.0,
                "priceType": "FIM_SEMANA_09H00_10H30",
                "startTime": "2024-07-01",
                "isActive": false,
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let prices = backend.prices.list().await.expect("list prices");
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].price_type.as_ref(), "FIM_SEMANA_09H00_10H30");
        assert!(!prices[0].is_active);
    }

    #[rstest]
    #[case(json!({"priceValue": 0.0, "priceType": "SEMANA_19H30_21H00", "startTime": "2024-06-01", "isActive": true}))]
    #[case(json!({"priceValue": 10.0, "priceType": "ANYTIME", "startTime": "2024-06-01", "isActive": true}))]
    #[case(json!({"priceValue": 10.0, "priceType": "SEMANA_19H30_21H00", "startTime": "01-06-2024", "isActive": true}))]
    #[actix_web::test]
    async fn malformed_prices_are_rejected(#[case] body: Value) {
        let backend = TestBackend::new();
        let admin = backend.seed_admin().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/prices/create")
            .insert_header(("Authorization", backend.bearer(&admin)))
            .set_json(body)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case("POST", "/api/v1/prices/create")]
    #[case("PUT", "/api/v1/prices/1/update")]
    #[actix_web::test]
    async fn mutations_are_admin_only(#[case] method: &str, #[case] uri: &str) {
        let backend = TestBackend::new();
        let rui = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let builder = match method {
            "POST" => actix_test::TestRequest::post(),
            _ => actix_test::TestRequest::put(),
        };
        let req = builder
            .uri(uri)
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(price_body())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn listing_is_open_to_any_authenticated_user() {
        let backend = TestBackend::new();
        let rui = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/prices")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
