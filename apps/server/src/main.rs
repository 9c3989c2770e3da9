#![warn(clippy::all, clippy::pedantic)]

use std::env::var;
use std::net::SocketAddr;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use fleetwatch::{DiagnosticsContext, FleetConfig};
use tokio::sync::mpsc;
use tracing::{debug, info};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

const DEFAULT_BIND: &str = "0.0.0.0:8081";

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = FleetConfig::from_config(var("FLEETWATCH_CONFIG").ok())?.with_env_overrides();
    info!("{config}");

    let context = web::Data::new(DiagnosticsContext::from_config(&config)?);

    start_quick_checks(&context, Duration::from_secs(config.schedule.quick_check_secs));

    let addr: SocketAddr = var("FLEETWATCH_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()).parse()?;
    run_server(addr, context).await
}

/// Background quick checks; results are only logged
fn start_quick_checks(context: &DiagnosticsContext, period: Duration) {
    let (result_tx, mut result_rx) = mpsc::channel(16);
    if context.start_quick_checks(period, result_tx).is_none() {
        return;
    }

    tokio::spawn(async move {
        while let Some(result) = result_rx.recv().await {
            debug!(timestamp = %result.timestamp, failed = result.failed_checks(), "Quick check received");
        }
    });
}

async fn run_server(addr: SocketAddr, context: web::Data<DiagnosticsContext>) -> Result<(), AppError> {
    info!(%addr, "Starting fleetwatch server");

    HttpServer::new(move || App::new().app_data(context.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
