// Application state for HTTP handlers
use crate::application::render_trigger::TriggerState;
use crate::domain::controls::Controls;
use crate::domain::dashboard::Dashboard;
use crate::infrastructure::config::GreenhouseConfigFile;
use std::sync::Arc;
use tokio::sync::watch;

pub struct AppState {
    pub greenhouse: Arc<GreenhouseConfigFile>,
    pub controls: watch::Sender<Controls>,
    pub dashboard: watch::Receiver<Option<Dashboard>>,
    pub status: watch::Receiver<TriggerState>,
}
