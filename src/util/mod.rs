pub mod clock;
pub mod env;
pub mod telemetry;
