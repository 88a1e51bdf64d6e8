//! # thermobridge-adapter-http-axum
//!
//! Administrative HTTP surface built on axum.
//!
//! Exposes the `/admin/{op}[/{zone}[/{param}]]` route family and translates
//! operator requests into scheduler and lifecycle operations:
//!
//! | op | method | effect |
//! |---|---|---|
//! | `STATUS` | GET | per-zone status projection |
//! | `START` | POST | start polling for N minutes |
//! | `STOP` | POST | stop polling |
//! | `INTERVAL` | POST | replace the poll period |
//! | `SET` | POST | relay a target temperature upstream |
//! | `IOTRESET` | POST | re-initialize all device sessions |
//! | `NETATMORESET` | POST | re-authenticate all sensor sessions |
//!
//! Operation names match case-insensitively. Success with a state change is
//! `204 No Content`; intent already satisfied is `202 Accepted`; validation
//! failures are `400`; collaborator failures during resets are `500`.

pub mod admin;
pub mod error;
pub mod router;
pub mod state;

pub use router::build;
pub use state::AppState;
