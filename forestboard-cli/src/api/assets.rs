//! Static passthrough for the dashboard directory.

use std::path::{Component, Path, PathBuf};

use actix_web::{web, HttpResponse};

use super::{endpoint_not_found, ApiError, ApiState};

const INDEX: &str = "index.html";

/// GET /
pub async fn index(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    serve(&state.dashboard, INDEX)
}

/// GET /{path}
pub async fn file(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    serve(&state.dashboard, &path)
}

fn serve(root: &Path, relative: &str) -> Result<HttpResponse, ApiError> {
    let Some(path) = resolve(root, relative) else {
        log::warn!("refusing asset path {relative:?}");
        return Ok(endpoint_not_found());
    };
    if !path.is_file() {
        return Ok(endpoint_not_found());
    }
    let bytes = std::fs::read(&path).map_err(|source| ApiError::Asset {
        path: path.clone(),
        source,
    })?;
    Ok(HttpResponse::Ok()
        .content_type(content_type(&path))
        .body(bytes))
}

/// Join `relative` onto `root`, refusing anything that could step outside it.
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let mut out = root.to_path_buf();
    let mut depth = 0;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (depth > 0).then_some(out)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
