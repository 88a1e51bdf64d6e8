//! Bridge services wired between the scheduler, the registry, and the
//! collaborator ports.

pub mod command_bridge;
pub mod lifecycle;
pub mod telemetry_bridge;

pub use command_bridge::CommandBridge;
pub use lifecycle::LifecycleService;
pub use telemetry_bridge::TelemetryBridge;
