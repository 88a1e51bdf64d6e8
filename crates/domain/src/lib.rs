//! # thermobridge-domain
//!
//! Pure domain model for the thermobridge demozone orchestrator.
//!
//! ## Responsibilities
//! - Foundational types: the case-normalized [`zone::ZoneId`], error
//!   conventions, timestamps
//! - Define **Zones** (one per demozone: scheduling status, poll period,
//!   sensor identity)
//! - Define **Readings** (thermostat measurements and the telemetry schema
//!   pushed upstream)
//! - Define **Set-point commands** (the composite `<deviceId>/<temperature>`
//!   payload delivered by the device platform) and their bounds
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod command;
pub mod error;
pub mod telemetry;
pub mod time;
pub mod zone;
