//! Shared harness for the HTTP flow suites.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the app assembly lives here: the real `/api/v1` surface mounted over the
//! in-memory adapters.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use backend::inbound::http::api_services;
use backend::test_support::TestBackend;

pub fn test_app(
    backend: &TestBackend,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(backend.state()))
        .service(web::scope("/api/v1").configure(api_services))
}
