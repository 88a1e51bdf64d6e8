//! # thermobridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports):
//!   - `SensorPlatform` / `SensorSession` — thermostat reads and set-points
//!   - `DevicePlatform` / `DeviceSession` — activation, telemetry push,
//!     upstream action relay
//!   - `SetupStore` — zone roster fetch and target-temperature persistence
//! - Own the per-zone state machine:
//!   - [`registry::ZoneRegistry`] — canonical zone records, session slots,
//!     sensor health
//!   - [`scheduler::ZoneScheduler`] — at most one poll task and one
//!     auto-stop timer per zone, start/stop/reconfigure/status
//! - Provide the bridge services invoked by timers and callbacks:
//!   - `TelemetryBridge` — one fetch-and-forward poll cycle
//!   - `CommandBridge` — inbound set-point dispatch
//!   - `LifecycleService` — device/sensor session startup and resets
//!
//! ## Dependency rule
//! Depends on `thermobridge-domain` only (plus `tokio` for timers and
//! channels). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod services;
