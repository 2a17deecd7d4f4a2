//! Thin HTTP pass-through over the catalog cache.
//!
//! - `GET /api/packages?type=formula|cask&q=...`: filtered raw upstream objects
//! - `GET /api/packages/{type}/{token}`: one normalized record plus its detail view
//! - `GET /health`
//!
//! Filtering goes through [`query::filter`](crate::query::filter), so results
//! match what the terminal list shows for the same query.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::RawPackage;
use crate::cache::{CatalogCache, CatalogSource, Clock};
use crate::detail::DetailView;
use crate::error::Result;
use crate::normalize::{PackageKind, normalize};
use crate::query;

pub struct AppState<S, C> {
    pub cache: Arc<CatalogCache<S, C>>,
    pub api_base: Arc<str>,
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            api_base: Arc::clone(&self.api_base),
        }
    }
}

impl<S, C> AppState<S, C> {
    pub fn new(cache: Arc<CatalogCache<S, C>>, api_base: impl Into<Arc<str>>) -> Self {
        Self {
            cache,
            api_base: api_base.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackagesQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

pub fn router<S, C>(state: AppState<S, C>) -> Router
where
    S: CatalogSource + 'static,
    C: Clock + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/packages", get(list_packages::<S, C>))
        .route("/api/packages/:kind/:token", get(package_detail::<S, C>))
        .layer(cors)
        .with_state(state)
}

pub async fn serve<S, C>(state: AppState<S, C>, host: &str, port: u16) -> Result<()>
where
    S: CatalogSource + 'static,
    C: Clock + 'static,
{
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("brewlens API listening on {}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "name": "brewlens",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/packages
async fn list_packages<S, C>(
    State(state): State<AppState<S, C>>,
    Query(params): Query<PackagesQuery>,
) -> Response
where
    S: CatalogSource + 'static,
    C: Clock + 'static,
{
    let kind = match params.kind.as_deref().map(str::trim) {
        None | Some("") => PackageKind::Formula,
        Some(raw) => match raw.parse::<PackageKind>() {
            Ok(kind) => kind,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
    };
    let q = params.q.unwrap_or_default();

    match state.cache.get_catalog(kind).await {
        Ok(records) => {
            let matches: Vec<&RawPackage> = query::filter(&records, &q)
                .into_iter()
                .map(|record| record.raw())
                .collect();
            Json(matches).into_response()
        }
        Err(e) => {
            error!(%kind, error = %e, "failed to serve package list");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch packages")
        }
    }
}

/// GET /api/packages/{type}/{token}
async fn package_detail<S, C>(
    State(state): State<AppState<S, C>>,
    Path((kind, token)): Path<(String, String)>,
) -> Response
where
    S: CatalogSource + 'static,
    C: Clock + 'static,
{
    let kind = match kind.parse::<PackageKind>() {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.cache.source().fetch_package(kind, &token).await {
        Ok(raw) => {
            let record = normalize(raw);
            let detail = DetailView::from_record(&record, &state.api_base);
            Json(json!({ "record": record, "detail": detail })).into_response()
        }
        Err(e) if e.is_not_found() => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => {
            error!(%kind, token = %token, error = %e, "failed to fetch package");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch package")
        }
    }
}
