//! # Publish API Server
//!
//! Actix-web server for post publication: scheduling, manual publish and
//! unpublish, and the scheduler sweep endpoint.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Publish API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;

    #[cfg(feature = "scheduler")]
    let mut scheduler = start_scheduler(&config, &state).await;

    let server_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(server_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    stop_scheduler(scheduler.as_mut()).await;

    result
}

/// Start the in-process sweep caller when `SCHEDULER_ENABLED` is set.
/// Failing to start it is logged; the HTTP trigger still works.
#[cfg(feature = "scheduler")]
async fn start_scheduler(config: &AppConfig, state: &AppState) -> Option<background::Scheduler> {
    if !config.scheduler.enabled {
        tracing::info!("Periodic sweep disabled; rely on GET /api/posts/check-and-publish");
        return None;
    }

    let scheduler = match background::Scheduler::new(config.scheduler.clone()).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create scheduler");
            return None;
        }
    };

    if let Err(e) = background::register_sweep(&scheduler, state.sweep.clone()).await {
        tracing::error!(error = %e, "Failed to register sweep job");
        return None;
    }
    if let Err(e) = scheduler.start().await {
        tracing::error!(error = %e, "Failed to start scheduler");
        return None;
    }

    Some(scheduler)
}

#[cfg(feature = "scheduler")]
async fn stop_scheduler(scheduler: Option<&mut background::Scheduler>) {
    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }
}
