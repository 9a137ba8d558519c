pub mod config;
pub mod crm;
pub mod error;
pub mod telemetry;
