//! Infrastructure adapters (storage, notification transports, HTTP, telemetry).

pub mod error;
pub mod http;
pub mod memory;
pub mod notify;
pub mod telemetry;
