use anyhow::{Context, Result};
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use forestboard_core::config::Config;

use crate::api::{self, ApiState};

/// Run the HTTP service until interrupted.
pub fn run(config: &Config) -> Result<()> {
    let state = web::Data::new(ApiState::from_config(config));
    let host = config.server.host.clone();
    let port = config.server.port;

    log::info!("results file: {}", state.store.path().display());
    log::info!(
        "results file exists: {}",
        if state.store.exists() { "yes" } else { "no" }
    );
    log::info!("dashboard: {}", state.dashboard.display());
    log::info!("listening on http://{host}:{port}");

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .wrap(Logger::default())
                    .app_data(state.clone())
                    .configure(api::configure)
            })
            .bind((host.as_str(), port))?
            .run()
            .await
        })
        .with_context(|| format!("server on {}:{} failed", config.server.host, port))
}
