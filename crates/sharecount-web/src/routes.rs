use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sharecount_core::{Collector, SelectionSet};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::WebError;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

pub fn router(collector: Collector) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/stats", get(stats))
        .with_state(collector)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    url: Option<String>,
    platforms: Option<String>,
}

async fn index() -> &'static str {
    "sharecount."
}

async fn stats(
    State(collector): State<Collector>,
    Query(params): Query<StatsParams>,
) -> Result<Response, WebError> {
    let url = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(WebError::MissingUrl)?;
    let selection = params
        .platforms
        .as_deref()
        .map(SelectionSet::parse)
        .unwrap_or_default();

    let started = Instant::now();
    let report = collector.collect(url, &selection).await;
    let body = serde_json::to_string(&report).map_err(WebError::Serialization)?;
    info!(
        url,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "compiled stats"
    );

    Ok(json_response(StatusCode::OK, body))
}

pub(crate) fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}
