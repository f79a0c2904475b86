//! Reservation handlers: booking, date and future queries, reschedule,
//! cancel.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Error;
use crate::domain::reservation::{Reservation, ReservationRequest, ReservationView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthContext, current_user, require_admin};
use crate::inbound::http::error::map_reservation_store_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_reservation_error, parse_date, parse_time, parse_timestamp,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Wire form of a booked slot.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: i64,
    pub field_id: i64,
    pub price_id: i64,
    pub initial_time: String,
    pub end_time: String,
    pub cancelled: bool,
}

impl From<Reservation> for ReservationDto {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            field_id: reservation.field_id,
            price_id: reservation.price_id,
            initial_time: reservation.starts_at.format(TIMESTAMP_FORMAT).to_string(),
            end_time: reservation.ends_at.format(TIMESTAMP_FORMAT).to_string(),
            cancelled: reservation.cancelled,
        }
    }
}

/// Booking request body. Timestamps use `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub field_id: i64,
    pub price_id: i64,
    pub initial_time: String,
    pub end_time: String,
}

/// Book a slot on a field.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/create",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Slot booked", body = ReservationDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Field or price does not exist", body = Error),
        (status = 409, description = "Slot already reserved or field unavailable", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "createReservation"
)]
#[post("/reservations/create")]
pub async fn create_reservation(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateReservationRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&auth, state.users.as_ref()).await?;
    let payload = payload.into_inner();
    let starts_at = parse_timestamp(&payload.initial_time, FieldName::new("initialTime"))?;
    let ends_at = parse_timestamp(&payload.end_time, FieldName::new("endTime"))?;
    let request = ReservationRequest::new(
        user.id(),
        payload.field_id,
        payload.price_id,
        starts_at,
        ends_at,
    )
    .map_err(|e| map_reservation_error(&e))?;

    let reservation = state
        .reservations
        .create(request)
        .await
        .map_err(map_reservation_store_error)?;
    info!(
        user_id = %user.id(),
        reservation_id = reservation.id,
        field_id = reservation.field_id,
        "slot booked"
    );
    Ok(HttpResponse::Created().json(ReservationDto::from(reservation)))
}

/// A reservation as listed in the per-date view.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateReservationDto {
    pub id: i64,
    pub field_id: i64,
    pub date: NaiveDate,
    pub initial_time: String,
}

/// Reservations starting on a calendar date.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/date/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD date")),
    responses(
        (status = 200, description = "Reservations that day", body = [DateReservationDto]),
        (status = 400, description = "Malformed date", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "reservationsForDate"
)]
#[get("/reservations/date/{date}")]
pub async fn reservations_for_date(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<DateReservationDto>>> {
    current_user(&auth, state.users.as_ref()).await?;
    let date = parse_date(&path.into_inner(), FieldName::new("date"))?;
    let rows = state
        .reservations
        .list_for_date(date)
        .await
        .map_err(map_reservation_store_error)?;
    let rows = rows
        .into_iter()
        .map(|r| DateReservationDto {
            id: r.id,
            field_id: r.field_id,
            date: r.starts_at.date(),
            initial_time: r.starts_at.format("%H:%M:%S").to_string(),
        })
        .collect();
    Ok(web::Json(rows))
}

/// Future reservations enriched with client, field, and price labels. Admin
/// only.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/future/all",
    responses(
        (status = 200, description = "Upcoming reservations", body = [ReservationView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "futureReservations"
)]
#[get("/reservations/future/all")]
pub async fn future_reservations(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<ReservationView>>> {
    require_admin(&auth, state.users.as_ref()).await?;
    let rows = state
        .reservations
        .list_future(now_naive())
        .await
        .map_err(map_reservation_store_error)?;
    Ok(web::Json(rows))
}

/// Reschedule request body: the new start date and time. The reservation's
/// duration is preserved.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
}

/// Move a reservation to a new start, keeping its duration.
///
/// The owner may move their own reservation; an admin may move any. The
/// overlap rule applies to the shifted range.
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/update",
    params(("id" = i64, Path, description = "Reservation id")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Reservation moved"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller does not own the reservation", body = Error),
        (status = 404, description = "No such reservation", body = Error),
        (status = 409, description = "New slot already reserved", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "rescheduleReservation"
)]
#[put("/reservations/{id}/update")]
pub async fn reschedule_reservation(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<i64>,
    payload: web::Json<RescheduleRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&auth, state.users.as_ref()).await?;
    let payload = payload.into_inner();
    let date = parse_date(&payload.date, FieldName::new("date"))?;
    let time = parse_time(&payload.time, FieldName::new("time"))?;
    state
        .reservations
        .reschedule(
            path.into_inner(),
            user.id(),
            user.role().is_admin(),
            date.and_time(time),
        )
        .await
        .map_err(map_reservation_store_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// Cancel a reservation, freeing its slot.
///
/// Idempotent. The owner may cancel their own reservation; an admin may
/// cancel any.
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/cancel",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation cancelled"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller does not own the reservation", body = Error),
        (status = 404, description = "No such reservation", body = Error)
    ),
    tags = ["reservations"],
    operation_id = "cancelReservation"
)]
#[put("/reservations/{id}/cancel")]
pub async fn cancel_reservation(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&auth, state.users.as_ref()).await?;
    let id = path.into_inner();
    state
        .reservations
        .cancel(id, user.id(), user.role().is_admin())
        .await
        .map_err(map_reservation_store_error)?;
    info!(user_id = %user.id(), reservation_id = id, "reservation cancelled");
    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldSpec;
    use crate::domain::ports::{FieldRepository, PriceRepository, ReservationRepository};
    use crate::domain::price::{PriceSpec, PriceType};
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

    async fn seed_catalogue(backend: &TestBackend) -> (i64, i64) {
        let field = backend
            .fields
            .create(FieldSpec::new("Court 1", true).expect("spec"))
            .await
            .expect("create field");
        let price = backend
            .prices
            .create(
                PriceSpec::new(
                    17.5,
                    PriceType::new("SEMANA_19H30_21H00").expect("type"),
                    NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
                    true,
                )
                .expect("spec"),
            )
            .await
            .expect("create price");
        (field.id, price.id)
    }

    fn booking(field_id: i64, price_id: i64, start: &str, end: &str) -> Value {
        json!({
            "fieldId": field_id,
            "priceId": price_id,
            "initialTime": start,
            "endTime": end,
        })
    }

    #[actix_web::test]
    async fn booking_round_trips_through_the_date_listing() {
        let backend = TestBackend::new();
        let rui = backend.seed_regular().await;
        let (field_id, price_id) = seed_catalogue(&backend).await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, "2030-06-10 19:30:00", "2030-06-10 21:00:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(resp).await;
        assert_eq!(created["initialTime"], "2030-06-10 19:30:00");

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/reservations/date/2030-06-10")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let rows: Value = actix_test::read_body_json(resp).await;
        let rows = rows.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["fieldId"], field_id);
        assert_eq!(rows[0]["initialTime"], "19:30:00");
    }

    #[actix_web::test]
    async fn overlapping_bookings_conflict_until_cancelled() {
        let backend = TestBackend::new();
        let rui = backend.seed_regular().await;
        let (field_id, price_id) = seed_catalogue(&backend).await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, "2030-06-10 19:30:00", "2030-06-10 21:00:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(resp).await;
        let id = created["id"].as_i64().expect("reservation id");

        // Overlapping range on the same field.
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, "2030-06-10 20:00:00", "2030-06-10 21:30:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/reservations/{id}/cancel"))
            .insert_header(("Authorization", backend.bearer(&rui)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // Cancelling freed the slot.
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, "2030-06-10 20:00:00", "2030-06-10 21:30:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[case("2030-06-10 21:00:00", "2030-06-10 19:30:00", StatusCode::BAD_REQUEST)]
    #[case("2030-06-10T19:30:00", "2030-06-10 21:00:00", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn malformed_bookings_are_rejected(
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: StatusCode,
    ) {
        let backend = TestBackend::new();
        let rui = backend.seed_regular().await;
        let (field_id, price_id) = seed_catalogue(&backend).await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, start, end))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    #[actix_web::test]
    async fn booking_requires_existing_catalogue_rows() {
        let backend = TestBackend::new();
        let rui = backend.seed_regular().await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(41, 42, "2030-06-10 19:30:00", "2030-06-10 21:00:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn only_the_owner_or_an_admin_reschedules() {
        let backend = TestBackend::new();
        let admin = backend.seed_admin().await;
        let rui = backend.seed_regular().await;
        let maria = backend
            .seed_user("Maria", "Costa", "maria.costa@example.pt", crate::domain::Role::Regular)
            .await;
        let (field_id, price_id) = seed_catalogue(&backend).await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, "2030-06-10 19:30:00", "2030-06-10 21:00:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let created: Value = actix_test::read_body_json(resp).await;
        let id = created["id"].as_i64().expect("reservation id");

        // Another regular user may not move it.
        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/reservations/{id}/update"))
            .insert_header(("Authorization", backend.bearer(&maria)))
            .set_json(json!({"date": "2030-06-11", "time": "10:00"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // An admin may.
        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/reservations/{id}/update"))
            .insert_header(("Authorization", backend.bearer(&admin)))
            .set_json(json!({"date": "2030-06-11", "time": "10:00"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let rows = backend
            .reservations
            .list_for_date(NaiveDate::from_ymd_opt(2030, 6, 11).expect("date"))
            .await
            .expect("list for date");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].starts_at.time(),
            chrono::NaiveTime::from_hms_opt(10, 0, 0).expect("time")
        );
        // Duration preserved: 90 minutes.
        assert_eq!(rows[0].ends_at - rows[0].starts_at, chrono::Duration::minutes(90));
    }

    #[actix_web::test]
    async fn future_listing_is_admin_only_and_enriched() {
        let backend = TestBackend::new();
        let admin = backend.seed_admin().await;
        let rui = backend.seed_regular().await;
        let (field_id, price_id) = seed_catalogue(&backend).await;
        let app = actix_test::init_service(test_app(&backend)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .set_json(booking(field_id, price_id, "2030-06-10 19:30:00", "2030-06-10 21:00:00"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/reservations/future/all")
            .insert_header(("Authorization", backend.bearer(&rui)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/reservations/future/all")
            .insert_header(("Authorization", backend.bearer(&admin)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let rows: Value = actix_test::read_body_json(resp).await;
        let rows = rows.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["client"], rui.display_name());
        assert_eq!(rows[0]["field"], "Court 1");
    }
}
