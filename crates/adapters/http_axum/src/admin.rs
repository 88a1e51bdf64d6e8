//! Admin operation handlers.
//!
//! One parameterized route family, `/admin/{op}[/{zone}[/{param}]]`, with
//! the operation name matched case-insensitively. Soft outcomes (already
//! running, already stopped, not running) map to `202 Accepted`; real
//! state changes map to `204 No Content`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use thermobridge_app::ports::{DevicePlatform, SensorPlatform};
use thermobridge_app::scheduler::{ReconfigureOutcome, StartOutcome, StopOutcome, ZoneReport};
use thermobridge_domain::error::{BridgeError, InvalidParameterError};
use thermobridge_domain::zone::ZoneId;

use crate::error::ApiError;
use crate::state::AppState;

/// Successful admin responses.
pub enum AdminResponse {
    /// State changed.
    NoContent,
    /// Intent already satisfied; no state change.
    Accepted(&'static str),
    /// STATUS projection.
    Status(Vec<ZoneReport>),
}

impl IntoResponse for AdminResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::Accepted(message) => (StatusCode::ACCEPTED, message).into_response(),
            Self::Status(reports) => (StatusCode::OK, Json(reports)).into_response(),
        }
    }
}

/// JSON body of the INTERVAL operation.
#[derive(Debug, Deserialize)]
pub struct IntervalBody {
    /// New poll period in seconds.
    pub interval: u32,
}

#[derive(Debug, Clone, Copy)]
enum AdminOp {
    Start,
    Stop,
    Status,
    Interval,
    Set,
    IotReset,
    NetatmoReset,
}

impl AdminOp {
    fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.to_ascii_uppercase().as_str() {
            "START" => Ok(Self::Start),
            "STOP" => Ok(Self::Stop),
            "STATUS" => Ok(Self::Status),
            "INTERVAL" => Ok(Self::Interval),
            "SET" => Ok(Self::Set),
            "IOTRESET" => Ok(Self::IotReset),
            "NETATMORESET" => Ok(Self::NetatmoReset),
            _ => Err(invalid("op", format!("operation '{raw}' not supported"))),
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ApiError {
    ApiError::from(BridgeError::from(InvalidParameterError::new(name, reason)))
}

/// `GET /admin/{op}` — STATUS is the only readable operation.
pub async fn op_get<DP, SP>(
    State(state): State<AppState<DP, SP>>,
    Path(op): Path<String>,
) -> Result<AdminResponse, ApiError>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    match AdminOp::parse(&op)? {
        AdminOp::Status => Ok(AdminResponse::Status(state.scheduler.status_snapshot())),
        _ => Err(invalid("op", format!("operation '{op}' is not readable"))),
    }
}

/// `POST /admin/{op}` — zone-less operations: the two resets. Zone-scoped
/// operations posted without a zone are rejected.
pub async fn op_post<DP, SP>(
    State(state): State<AppState<DP, SP>>,
    Path(op): Path<String>,
) -> Result<AdminResponse, ApiError>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    match AdminOp::parse(&op)? {
        AdminOp::IotReset => reset_devices(&state).await,
        AdminOp::NetatmoReset => reset_sensors(&state).await,
        AdminOp::Start | AdminOp::Stop | AdminOp::Interval | AdminOp::Set => {
            Err(invalid("demozone", "missing demozone path segment"))
        }
        AdminOp::Status => Err(invalid("op", "STATUS is read-only, use GET")),
    }
}

/// `POST /admin/{op}/{zone}` — STOP and INTERVAL; the resets ignore the
/// extra segment.
pub async fn zone_post<DP, SP>(
    State(state): State<AppState<DP, SP>>,
    Path((op, zone)): Path<(String, String)>,
    body: Result<Json<IntervalBody>, JsonRejection>,
) -> Result<AdminResponse, ApiError>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    let id = ZoneId::new(&zone);
    match AdminOp::parse(&op)? {
        AdminOp::Stop => match state.scheduler.stop(&id)? {
            StopOutcome::Stopped => Ok(AdminResponse::NoContent),
            StopOutcome::AlreadyStopped => Ok(AdminResponse::Accepted("already stopped")),
        },
        AdminOp::Interval => {
            let Json(body) =
                body.map_err(|err| invalid("interval", format!("invalid body: {err}")))?;
            match state.scheduler.reconfigure(&id, body.interval)? {
                ReconfigureOutcome::Applied => Ok(AdminResponse::NoContent),
                ReconfigureOutcome::NotRunning => Ok(AdminResponse::Accepted("not running")),
            }
        }
        AdminOp::Start => Err(invalid("minutes", "missing duration path segment")),
        AdminOp::Set => Err(invalid("temperature", "missing temperature path segment")),
        AdminOp::IotReset => reset_devices(&state).await,
        AdminOp::NetatmoReset => reset_sensors(&state).await,
        AdminOp::Status => Err(invalid("op", "STATUS is read-only, use GET")),
    }
}

/// `POST /admin/{op}/{zone}/{param}` — START and SET.
pub async fn zone_param_post<DP, SP>(
    State(state): State<AppState<DP, SP>>,
    Path((op, zone, param)): Path<(String, String, String)>,
) -> Result<AdminResponse, ApiError>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    let id = ZoneId::new(&zone);
    match AdminOp::parse(&op)? {
        AdminOp::Start => {
            let minutes: u32 = param
                .parse()
                .map_err(|_| invalid("minutes", "must be a positive number"))?;
            match state.scheduler.start(&id, minutes)? {
                StartOutcome::Started => Ok(AdminResponse::NoContent),
                StartOutcome::AlreadyRunning { .. } => {
                    Ok(AdminResponse::Accepted("already running"))
                }
            }
        }
        AdminOp::Set => {
            let temperature: f64 = param
                .parse()
                .map_err(|_| invalid("temperature", "must be a number"))?;
            if temperature <= 0.0 {
                return Err(invalid("temperature", "must be a positive number"));
            }
            let target = state.registry.schedulable(&id)?;
            let value = format!("{}/{temperature}", target.sensor_identity.device_id);
            state.device_platform.invoke_set_action(&id, &value).await?;
            tracing::info!(zone = %id, temperature, "set-point relayed upstream");
            Ok(AdminResponse::NoContent)
        }
        AdminOp::IotReset => reset_devices(&state).await,
        AdminOp::NetatmoReset => reset_sensors(&state).await,
        _ => Err(invalid("op", format!("operation '{op}' takes no parameter"))),
    }
}

async fn reset_devices<DP, SP>(state: &AppState<DP, SP>) -> Result<AdminResponse, ApiError>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    state.lifecycle.reset_devices().await?;
    Ok(AdminResponse::NoContent)
}

async fn reset_sensors<DP, SP>(state: &AppState<DP, SP>) -> Result<AdminResponse, ApiError>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    state.lifecycle.reset_sensors().await;
    Ok(AdminResponse::NoContent)
}
