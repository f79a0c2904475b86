//! Backend entry-point: configuration, migrations, pool, and HTTP wiring.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::auth::{TokenService, secret_fingerprint};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::mail::SmtpMailer;
use backend::outbound::persistence::{
    DbPool, DieselFieldRepository, DieselNotificationRepository, DieselPriceRepository,
    DieselReservationRepository, DieselUserRepository, PoolConfig, migrations,
};
use backend::server::{AppConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    info!(
        signing_key_fingerprint = %secret_fingerprint(&config.token_secret),
        "token signing key loaded"
    );

    migrations::run_pending(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(config.database_url.clone()))
        .await
        .map_err(std::io::Error::other)?;

    let mailer = SmtpMailer::new(&config.smtp).map_err(std::io::Error::other)?;

    let http_state = web::Data::new(HttpState {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        fields: Arc::new(DieselFieldRepository::new(pool.clone())),
        prices: Arc::new(DieselPriceRepository::new(pool.clone())),
        reservations: Arc::new(DieselReservationRepository::new(pool)),
        mailer: Arc::new(mailer),
        tokens: Arc::new(TokenService::new(&config.token_secret)),
        reset_url_base: config.reset_url_base.clone(),
    });

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, config.bind_addr)?;
    info!(addr = %config.bind_addr, "listening");
    server.await
}
