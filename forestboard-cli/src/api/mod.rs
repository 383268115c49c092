//! Read-only HTTP API over the results document.
//!
//! Every data route re-reads the document from disk; nothing is cached
//! between requests. Unknown paths and missing assets answer
//! `404 {"error": "Endpoint not found", "status": "error"}`.

use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Serialize;

use forestboard_core::config::Config;
use forestboard_core::store::ResultsStore;

mod assets;
mod handlers;

/// Shared, immutable service configuration.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub store: ResultsStore,
    pub dashboard: PathBuf,
    pub sample_limit: usize,
}

impl ApiState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: ResultsStore::new(&config.data.output),
            dashboard: config.server.dashboard.clone(),
            sample_limit: config.training.sample_limit,
        }
    }
}

/// Register every route plus the JSON 404 fallback.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(handlers::health))
        .route("/api/model/info", web::get().to(handlers::model_info))
        .route("/api/model/predictions", web::get().to(handlers::predictions))
        .route("/api/model/evaluation", web::get().to(handlers::evaluation))
        .route("/api/model/metrics/summary", web::get().to(handlers::metrics_summary))
        .route("/api/model/all", web::get().to(handlers::all))
        .route("/", web::get().to(assets::index))
        .route("/{path:.*}", web::get().to(assets::file))
        .default_service(web::to(not_found));
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    status: &'static str,
}

pub async fn not_found() -> HttpResponse {
    endpoint_not_found()
}

fn endpoint_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: "Endpoint not found",
        status: "error",
    })
}

/// Faults that are not a missing document. The client only ever sees a
/// generic 500; the detail goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("response body is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("cannot read asset {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("{self}");
        HttpResponse::InternalServerError().json(ErrorBody {
            error: "Internal server error",
            status: "error",
        })
    }
}
