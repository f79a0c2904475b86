//! OpenAPI documentation configuration.
//!
//! The [`ApiDoc`] struct generates the OpenAPI specification for the REST
//! API: every handler path from the inbound layer, the wire schemas, and the
//! bearer-token security scheme. The generated document backs Swagger UI in
//! debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::notification::NotificationView;
use crate::domain::reservation::ReservationView;
use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::clients::{
    ChangePasswordRequest, ClientDto, LoginRequest, RecoverPasswordRequest,
    RecoverPasswordResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    ResetPasswordRequest, RoleChangeRequest, TokenPairResponse, UpdateProfileRequest,
};
use crate::inbound::http::fields::{FieldDto, FieldRequest};
use crate::inbound::http::notifications::{
    CreateNotificationRequest, CreateNotificationResponse, MarkReadRequest,
};
use crate::inbound::http::prices::{PriceDto, PriceRequest};
use crate::inbound::http::reservations::{
    CreateReservationRequest, DateReservationDto, RescheduleRequest, ReservationDto,
};
use crate::inbound::http::statistics::UsageCountDto;

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/v1/client/login.".to_owned(),
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Court booking backend API",
        description = "HTTP interface for account, notification, catalogue, \
                       and reservation management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::clients::register,
        crate::inbound::http::clients::login,
        crate::inbound::http::clients::logout,
        crate::inbound::http::clients::refresh_token,
        crate::inbound::http::clients::recover_password,
        crate::inbound::http::clients::reset_password,
        crate::inbound::http::clients::change_password,
        crate::inbound::http::clients::get_profile,
        crate::inbound::http::clients::update_profile,
        crate::inbound::http::clients::delete_account,
        crate::inbound::http::clients::delete_account_post,
        crate::inbound::http::clients::list_clients,
        crate::inbound::http::clients::promote_to_admin,
        crate::inbound::http::clients::demote_to_regular,
        crate::inbound::http::notifications::create_notification,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_notification_read,
        crate::inbound::http::fields::list_fields,
        crate::inbound::http::fields::create_field,
        crate::inbound::http::fields::update_field,
        crate::inbound::http::fields::delete_field,
        crate::inbound::http::fields::unused_fields,
        crate::inbound::http::prices::list_prices,
        crate::inbound::http::prices::create_price,
        crate::inbound::http::prices::update_price,
        crate::inbound::http::reservations::create_reservation,
        crate::inbound::http::reservations::reservations_for_date,
        crate::inbound::http::reservations::future_reservations,
        crate::inbound::http::reservations::reschedule_reservation,
        crate::inbound::http::reservations::cancel_reservation,
        crate::inbound::http::statistics::frequent_field,
        crate::inbound::http::statistics::frequent_time,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        ClientDto,
        TokenPairResponse,
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        RefreshResponse,
        RecoverPasswordRequest,
        RecoverPasswordResponse,
        ResetPasswordRequest,
        ChangePasswordRequest,
        UpdateProfileRequest,
        RoleChangeRequest,
        CreateNotificationRequest,
        CreateNotificationResponse,
        MarkReadRequest,
        NotificationView,
        FieldDto,
        FieldRequest,
        PriceDto,
        PriceRequest,
        CreateReservationRequest,
        ReservationDto,
        DateReservationDto,
        RescheduleRequest,
        ReservationView,
        UsageCountDto,
    )),
    tags(
        (name = "clients", description = "Account, session, and role management"),
        (name = "notifications", description = "Notification fan-out and read flags"),
        (name = "fields", description = "Bookable court reference data"),
        (name = "prices", description = "Slot price reference data"),
        (name = "reservations", description = "Court bookings and queries"),
        (name = "statistics", description = "Usage statistics over trailing windows"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn client_schema_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let client_schema = schemas.get("ClientDto").expect("ClientDto schema");

        assert_object_schema_has_field(client_schema, "firstName");
        assert_object_schema_has_field(client_schema, "phoneNumber");
        assert_object_schema_has_field(client_schema, "nif");
    }

    #[test]
    fn every_booking_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/client/register",
            "/api/v1/client/login",
            "/api/v1/client/refresh-token",
            "/api/v1/client/recover-password",
            "/api/v1/client/reset-password",
            "/api/v1/manual-notification/create",
            "/api/v1/reservations/create",
            "/api/v1/statistics/frequent-field/{period}",
            "/api/v1/fields/unused/{kind}/{value}",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing documented path: {path}"
            );
        }
    }
}
