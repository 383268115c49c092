use std::path::{Path, PathBuf};

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::{Map, Value};

use forestboard_core::predictions::PredictionTable;
use forestboard_core::store::DataUnavailable;
use forestboard_core::summary::MetricsSummary;

use super::{ApiError, ApiState};

const SUCCESS: &str = "success";

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    message: &'static str,
    debug_info: DebugInfo,
}

#[derive(Serialize)]
struct DebugInfo {
    current_directory: String,
    backend_location: String,
    artifacts_path: String,
    model_file_path: String,
    artifacts_exists: bool,
    model_file_exists: bool,
}

fn display_or_unknown(path: Option<PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// GET /api/health
pub async fn health(state: web::Data<ApiState>) -> HttpResponse {
    let store = &state.store;
    let backend = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    HttpResponse::Ok().json(HealthReport {
        status: "healthy",
        message: "ML Model API is running",
        debug_info: DebugInfo {
            current_directory: display_or_unknown(std::env::current_dir().ok()),
            backend_location: display_or_unknown(backend),
            artifacts_path: store.dir().display().to_string(),
            model_file_path: store.path().display().to_string(),
            artifacts_exists: store.dir().is_dir(),
            model_file_exists: store.exists(),
        },
    })
}

/// GET /api/model/info
pub async fn model_info(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    with_document(&state, |doc| Ok(section(doc, "model_info")))
}

/// GET /api/model/predictions
pub async fn predictions(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    let limit = state.sample_limit;
    with_document(&state, |doc| {
        let table = PredictionTable::from_document(&doc, limit);
        Ok(success(into_object(serde_json::to_value(table)?)?))
    })
}

/// GET /api/model/evaluation
pub async fn evaluation(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    with_document(&state, |doc| Ok(section(doc, "evaluation")))
}

/// GET /api/model/metrics/summary
pub async fn metrics_summary(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    with_document(&state, |doc| {
        let summary = serde_json::to_value(MetricsSummary::from_document(&doc))?;
        Ok(success(single("summary", summary)))
    })
}

/// GET /api/model/all
pub async fn all(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    with_document(&state, |doc| Ok(success(single("data", doc))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the document and hand it to `respond`; an unavailable document
/// becomes a 404 carrying the error payload.
fn with_document<F>(state: &ApiState, respond: F) -> Result<HttpResponse, ApiError>
where
    F: FnOnce(Value) -> Result<HttpResponse, ApiError>,
{
    match state.store.load() {
        Ok(doc) => respond(doc),
        Err(err) => Ok(unavailable(&err)),
    }
}

fn unavailable(err: &DataUnavailable) -> HttpResponse {
    log::warn!("results unavailable: {err}");
    HttpResponse::NotFound().json(err.payload())
}

/// `{<key>: doc[key] or {}, "status": "success"}`
fn section(mut doc: Value, key: &str) -> HttpResponse {
    let value = doc
        .get_mut(key)
        .map(Value::take)
        .unwrap_or_else(|| Value::Object(Map::new()));
    success(single(key, value))
}

/// Top-level fields of a serialized response body.
fn into_object(value: Value) -> Result<Map<String, Value>, ApiError> {
    match value {
        Value::Object(body) => Ok(body),
        other => Err(ApiError::NotAnObject(other.to_string())),
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    body
}

fn success(mut body: Map<String, Value>) -> HttpResponse {
    body.insert("status".to_string(), Value::from(SUCCESS));
    HttpResponse::Ok().json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use serde_json::json;

    #[test]
    fn object_bodies_pass_through() {
        let body = into_object(json!({"predictions": [], "sample_size": 0})).unwrap();
        assert_eq!(body.keys().collect::<Vec<_>>(), ["predictions", "sample_size"]);
    }

    #[test]
    fn non_object_body_is_an_internal_error() {
        let err = into_object(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ApiError::NotAnObject(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
