//! Axum router assembly.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use thermobridge_app::ports::{DevicePlatform, SensorPlatform};

use crate::admin;
use crate::state::AppState;

/// Build the admin [`Router`].
///
/// The binary nests this under its configured context root. Includes a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG`
/// level using the `tracing` ecosystem.
pub fn build<DP, SP>(state: AppState<DP, SP>) -> Router
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/admin/{op}", get(admin::op_get).post(admin::op_post))
        .route("/admin/{op}/{zone}", post(admin::zone_post))
        .route("/admin/{op}/{zone}/{param}", post(admin::zone_param_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
