//! End-to-end booking journey: account registration through reservation and
//! notification round-trips over the full `/api/v1` surface.

mod support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use backend::domain::Role;
use backend::test_support::TestBackend;
use support::test_app;

const ADMIN_EMAIL: &str = "gestor@example.com";

async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let register = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/client/register")
            .set_json(json!({
                "firstName": "Joana",
                "lastName": "Ferreira",
                "email": email,
                "password": "strong-password-9",
                "phoneNumber": "912345678",
                "nif": "123456789"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(register.status(), StatusCode::CREATED);

    let login = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/client/login")
            .set_json(json!({ "email": email, "password": "strong-password-9" }))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(login).await;
    format!("Bearer {}", body["token"].as_str().expect("access token"))
}

async fn create_court_and_price(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    admin_auth: &str,
) -> (Value, Value) {
    let field = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/fields/create")
            .insert_header(("Authorization", admin_auth.to_owned()))
            .set_json(json!({ "name": "Court 1", "available": true }))
            .to_request(),
    )
    .await;
    assert_eq!(field.status(), StatusCode::CREATED);
    let field: Value = actix_test::read_body_json(field).await;

    let price = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/prices/create")
            .insert_header(("Authorization", admin_auth.to_owned()))
            .set_json(json!({
                "priceValue": 12.5,
                "priceType": "SEMANA_19H30_21H00",
                "startTime": "2024-01-01",
                "isActive": true
            }))
            .to_request(),
    )
    .await;
    assert_eq!(price.status(), StatusCode::CREATED);
    let price: Value = actix_test::read_body_json(price).await;

    (field, price)
}

#[actix_web::test]
async fn a_registered_client_books_a_court_set_up_by_an_admin() {
    let backend = TestBackend::new();
    let admin = backend
        .seed_user("Gestor", "Principal", ADMIN_EMAIL, Role::Admin)
        .await;
    let admin_auth = backend.bearer(&admin);
    let app = actix_test::init_service(test_app(&backend)).await;

    let (field, price) = create_court_and_price(&app, &admin_auth).await;

    let client_auth = register_and_login(&app, "joana@example.com").await;

    let booking = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", client_auth.clone()))
            .set_json(json!({
                "fieldId": field["id"],
                "priceId": price["id"],
                "initialTime": "2030-06-10 19:30:00",
                "endTime": "2030-06-10 21:00:00"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(booking.status(), StatusCode::CREATED);
    let booking: Value = actix_test::read_body_json(booking).await;

    let day = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/reservations/date/2030-06-10")
            .insert_header(("Authorization", client_auth.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(day.status(), StatusCode::OK);
    let listed: Value = actix_test::read_body_json(day).await;
    let listed = listed.as_array().expect("reservation list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], booking["id"]);
    assert_eq!(listed[0]["fieldId"], field["id"]);

    // A second booking over the same slot is refused until the first one is
    // cancelled.
    let clash = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", client_auth.clone()))
            .set_json(json!({
                "fieldId": field["id"],
                "priceId": price["id"],
                "initialTime": "2030-06-10 20:00:00",
                "endTime": "2030-06-10 21:30:00"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(clash.status(), StatusCode::CONFLICT);

    let cancel = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/reservations/{}/cancel",
                booking["id"].as_i64().expect("booking id")
            ))
            .insert_header(("Authorization", client_auth.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(cancel.status(), StatusCode::OK);

    // Cancelling drops the row from the date page and frees the slot.
    let day = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/reservations/date/2030-06-10")
            .insert_header(("Authorization", client_auth.clone()))
            .to_request(),
    )
    .await;
    let listed: Value = actix_test::read_body_json(day).await;
    assert_eq!(listed.as_array().expect("reservation list").len(), 0);

    let rebook = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", client_auth))
            .set_json(json!({
                "fieldId": field["id"],
                "priceId": price["id"],
                "initialTime": "2030-06-10 19:30:00",
                "endTime": "2030-06-10 21:00:00"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(rebook.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn admins_notify_everyone_and_recipients_control_the_read_flag() {
    let backend = TestBackend::new();
    let admin = backend
        .seed_user("Gestor", "Principal", ADMIN_EMAIL, Role::Admin)
        .await;
    let admin_auth = backend.bearer(&admin);
    let app = actix_test::init_service(test_app(&backend)).await;

    let client_auth = register_and_login(&app, "joana@example.com").await;

    let send = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/manual-notification/create")
            .insert_header(("Authorization", admin_auth.clone()))
            .set_json(json!({
                "email": "all.clients@gmail.com",
                "message": "Courts close early on Friday"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(send.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(send).await;
    assert_eq!(created["createdCount"], 1);

    let inbox = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/manual-notification")
            .insert_header(("Authorization", client_auth.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(inbox.status(), StatusCode::OK);
    let inbox: Value = actix_test::read_body_json(inbox).await;
    let inbox = inbox.as_array().expect("notification list");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["senderEmail"], ADMIN_EMAIL);
    assert_eq!(inbox[0]["message"], "Courts close early on Friday");
    assert_eq!(inbox[0]["isRead"], false);

    let mark = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/manual-notification/{}/read",
                inbox[0]["id"].as_i64().expect("notification id")
            ))
            .insert_header(("Authorization", client_auth.clone()))
            .set_json(json!({ "isRead": true }))
            .to_request(),
    )
    .await;
    assert_eq!(mark.status(), StatusCode::OK);

    let inbox = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/manual-notification")
            .insert_header(("Authorization", client_auth))
            .to_request(),
    )
    .await;
    let inbox: Value = actix_test::read_body_json(inbox).await;
    assert_eq!(inbox[0]["isRead"], true);
}

#[actix_web::test]
async fn deleting_an_account_takes_its_bookings_and_notifications_with_it() {
    let backend = TestBackend::new();
    let admin = backend
        .seed_user("Gestor", "Principal", ADMIN_EMAIL, Role::Admin)
        .await;
    let admin_auth = backend.bearer(&admin);
    let app = actix_test::init_service(test_app(&backend)).await;

    let (field, price) = create_court_and_price(&app, &admin_auth).await;
    let client_auth = register_and_login(&app, "joana@example.com").await;

    let notify = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/manual-notification/create")
            .insert_header(("Authorization", admin_auth.clone()))
            .set_json(json!({
                "email": "joana@example.com",
                "message": "Welcome to the club"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(notify.status(), StatusCode::CREATED);

    let booking = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reservations/create")
            .insert_header(("Authorization", client_auth.clone()))
            .set_json(json!({
                "fieldId": field["id"],
                "priceId": price["id"],
                "initialTime": "2030-06-10 19:30:00",
                "endTime": "2030-06-10 21:00:00"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(booking.status(), StatusCode::CREATED);

    let goodbye = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/client/delete")
            .insert_header(("Authorization", client_auth))
            .to_request(),
    )
    .await;
    assert_eq!(goodbye.status(), StatusCode::OK);

    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/client/login")
            .set_json(json!({
                "email": "joana@example.com",
                "password": "strong-password-9"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    // Cascades clear the booking off the date page and the sent copy of the
    // notification out of the admin's list.
    let day = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/reservations/date/2030-06-10")
            .insert_header(("Authorization", admin_auth.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(day.status(), StatusCode::OK);
    let listed: Value = actix_test::read_body_json(day).await;
    assert_eq!(listed.as_array().expect("reservation list").len(), 0);

    let sent = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/manual-notification")
            .insert_header(("Authorization", admin_auth))
            .to_request(),
    )
    .await;
    assert_eq!(sent.status(), StatusCode::OK);
    let sent: Value = actix_test::read_body_json(sent).await;
    assert_eq!(sent.as_array().expect("notification list").len(), 0);
}
