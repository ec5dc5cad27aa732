// Application layer - Sample ingestion, windowing and the render loop
pub mod monitor_service;
pub mod render_trigger;
pub mod router;
pub mod sample_source;
pub mod session_store;
pub mod synthetic_source;
pub mod window_store;
