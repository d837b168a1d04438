use crate::api::api_error::APIError;
use crate::api::model::{PathRequest, QueryRequest};
use crate::api::server::AppState;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    let timeout = state.config.api_timeout;
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/update-by-path/:secret/:fqdn", get(update_by_path))
        .route("/update-by-path/:secret/:fqdn/:ip_1", get(update_by_path))
        .route(
            "/update-by-path/:secret/:fqdn/:ip_1/:ip_2",
            get(update_by_path),
        )
        .route("/update-by-query", get(update_by_query))
        .route("/delete-by-path/:secret/:fqdn", get(delete_by_path))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn update_by_path(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Path(request), _): WithRejection<Path<PathRequest>, APIError>,
) -> Result<String, APIError> {
    state.env.authenticate(&request.secret)?;
    tracing::debug!("update of \"{}\" requested by {client_addr}", request.fqdn);
    let params = request.update_params();
    Ok(state
        .env
        .update_record(&params, Some(client_addr.ip()))
        .await?)
}

async fn update_by_query(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Query(request), _): WithRejection<Query<QueryRequest>, APIError>,
) -> Result<String, APIError> {
    state.env.authenticate(&request.secret)?;
    tracing::debug!("update requested by {client_addr}");
    let params = request.update_params();
    Ok(state
        .env
        .update_record(&params, Some(client_addr.ip()))
        .await?)
}

async fn delete_by_path(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Path(request), _): WithRejection<Path<PathRequest>, APIError>,
) -> Result<String, APIError> {
    state.env.authenticate(&request.secret)?;
    tracing::debug!("deletion of \"{}\" requested by {client_addr}", request.fqdn);
    Ok(state.env.delete_record(&request.fqdn).await?)
}
