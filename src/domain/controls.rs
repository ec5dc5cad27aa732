// User-facing controls read by the render loop on every tick
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_REFRESH_SECS: f64 = 0.1;
pub const MAX_REFRESH_SECS: f64 = 5.0;
pub const DEFAULT_REFRESH_SECS: f64 = 1.0;

pub const MIN_MAX_POINTS: usize = 50;
pub const MAX_MAX_POINTS: usize = 500;
pub const DEFAULT_MAX_POINTS: usize = 150;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// One synthetic sample per plant on every tick
    #[default]
    Snapshot,
    /// One synthetic sample for a randomly chosen plant on every tick
    Random,
    /// Samples pushed by an external event stream
    Stream,
}

/// Identifies an open source; any change means the source must be reopened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    mode: SourceMode,
    stream_url: Option<String>,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    pub mode: SourceMode,
    pub stream_url: String,
    pub selected_plant: Option<String>,
    refresh_interval_secs: f64,
    max_points: usize,
    /// Bumped to force the source to reopen (reconnect, plant list edits)
    pub generation: u64,
}

/// Partial update as sent by the UI
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ControlsUpdate {
    pub mode: Option<SourceMode>,
    pub stream_url: Option<String>,
    pub selected_plant: Option<String>,
    pub refresh_interval_secs: Option<f64>,
    pub max_points: Option<usize>,
}

impl Controls {
    pub fn new(mode: SourceMode, stream_url: impl Into<String>) -> Self {
        Self {
            mode,
            stream_url: stream_url.into(),
            selected_plant: None,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            max_points: DEFAULT_MAX_POINTS,
            generation: 0,
        }
    }

    pub fn with_refresh_interval_secs(mut self, secs: f64) -> Self {
        self.set_refresh_interval_secs(secs);
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.set_max_points(max_points);
        self
    }

    pub fn set_refresh_interval_secs(&mut self, secs: f64) {
        self.refresh_interval_secs = if secs.is_finite() {
            secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
        } else {
            DEFAULT_REFRESH_SECS
        };
    }

    pub fn set_max_points(&mut self, max_points: usize) {
        self.max_points = max_points.clamp(MIN_MAX_POINTS, MAX_MAX_POINTS);
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_interval_secs)
    }

    pub fn refresh_interval_secs(&self) -> f64 {
        self.refresh_interval_secs
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn source_key(&self) -> SourceKey {
        SourceKey {
            mode: self.mode,
            stream_url: (self.mode == SourceMode::Stream).then(|| self.stream_url.clone()),
            generation: self.generation,
        }
    }

    pub fn request_reopen(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn apply(&mut self, update: ControlsUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(url) = update.stream_url {
            self.stream_url = url.trim().to_string();
        }
        if let Some(plant) = update.selected_plant {
            self.selected_plant = Some(plant).filter(|p| !p.is_empty());
        }
        if let Some(secs) = update.refresh_interval_secs {
            self.set_refresh_interval_secs(secs);
        }
        if let Some(max_points) = update.max_points {
            self.set_max_points(max_points);
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(SourceMode::default(), "http://127.0.0.1:8000/stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_clamped() {
        let controls = Controls::default()
            .with_refresh_interval_secs(0.01)
            .with_max_points(5_000);
        assert_eq!(controls.refresh_interval(), Duration::from_millis(100));
        assert_eq!(controls.max_points(), MAX_MAX_POINTS);

        let controls = controls
            .with_refresh_interval_secs(f64::NAN)
            .with_max_points(3);
        assert_eq!(controls.refresh_interval_secs(), DEFAULT_REFRESH_SECS);
        assert_eq!(controls.max_points(), MIN_MAX_POINTS);
    }

    #[test]
    fn test_source_key_ignores_url_outside_stream_mode() {
        let mut controls = Controls::default();
        let before = controls.source_key();

        controls.apply(ControlsUpdate {
            stream_url: Some("http://10.0.0.5:8000/stream".to_string()),
            max_points: Some(200),
            ..Default::default()
        });
        assert_eq!(controls.source_key(), before);

        controls.apply(ControlsUpdate {
            mode: Some(SourceMode::Stream),
            ..Default::default()
        });
        assert_ne!(controls.source_key(), before);
    }

    #[test]
    fn test_request_reopen_changes_key() {
        let mut controls = Controls::default();
        let before = controls.source_key();
        controls.request_reopen();
        assert_ne!(controls.source_key(), before);
    }

    #[test]
    fn test_apply_selection() {
        let mut controls = Controls::default();
        controls.apply(ControlsUpdate {
            selected_plant: Some("Basil_1".to_string()),
            ..Default::default()
        });
        assert_eq!(controls.selected_plant.as_deref(), Some("Basil_1"));

        controls.apply(ControlsUpdate {
            selected_plant: Some(String::new()),
            ..Default::default()
        });
        assert!(controls.selected_plant.is_none());
    }

    #[test]
    fn test_deserialize_update() {
        let update: ControlsUpdate =
            serde_json::from_str(r#"{"mode": "stream", "refresh_interval_secs": 2.5}"#).unwrap();
        assert_eq!(update.mode, Some(SourceMode::Stream));
        assert_eq!(update.refresh_interval_secs, Some(2.5));
        assert!(update.max_points.is_none());
    }
}
