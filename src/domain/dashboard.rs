// Dashboard domain model
use super::telemetry::ChartData;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything drawn for the selected plant on one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub plant: String,
    pub title: String,
    pub samples: usize,
    pub charts: Vec<ChartData>,
    pub rendered_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn new(plant: String, samples: usize, charts: Vec<ChartData>) -> Self {
        let title = format!("Monitoring: {}", plant);
        Self {
            plant,
            title,
            samples,
            charts,
            rendered_at: Utc::now(),
        }
    }
}
