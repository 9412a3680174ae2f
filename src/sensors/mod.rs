pub mod service;

pub use service::{TelemetryError, TelemetryService};
