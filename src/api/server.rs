use crate::api::routes;
use crate::config::SharedConfig;
use crate::environment::ConfiguredEnvironment;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub env: Arc<ConfiguredEnvironment>,
}

/// Bind the HTTP API to the configured address. The returned future serves requests until
/// it is dropped.
///
/// # Errors
///
/// Returns an error if the address can't be bound.
pub fn new(
    env: Arc<ConfiguredEnvironment>,
) -> hyper::Result<impl Future<Output = hyper::Result<()>>> {
    let config = env.config().clone();
    Ok(axum::Server::try_bind(&config.api_bind_addr)?.serve(
        routes::new(AppState { config, env })
            .into_make_service_with_connect_info::<SocketAddr>(),
    ))
}
