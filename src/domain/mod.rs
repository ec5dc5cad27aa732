// Domain layer - Plain data types shared by every other layer
pub mod controls;
pub mod dashboard;
pub mod metric;
pub mod sample;
pub mod session;
pub mod telemetry;
