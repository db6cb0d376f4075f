//! Registration intake pipeline and admin back office for the Rawad
//! mentorship platform.
//!
//! The library is organized around workflow modules: `workflows::registration`
//! covers the public intake pipeline (validation, CV transfer, persistence,
//! wizard shell) and `workflows::admin` covers the back office (login with
//! lockout, analytics, report export). `config`, `error`, and `telemetry`
//! carry the service-level plumbing shared by every binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
