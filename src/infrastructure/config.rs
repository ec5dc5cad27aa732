use crate::application::session_store::SessionStore;
use crate::domain::controls::{
    Controls, DEFAULT_MAX_POINTS, DEFAULT_REFRESH_SECS, SourceMode,
};
use crate::domain::session::Session;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub greenhouse_file: PathBuf,
    pub source: SourceSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceSettings {
    pub mode: SourceMode,
    pub stream_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    pub refresh_interval_secs: f64,
    pub max_points: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            greenhouse_file: PathBuf::from("greenhouse_info.json"),
            source: SourceSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            mode: SourceMode::Snapshot,
            stream_url: "http://127.0.0.1:8000/stream".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 10,
            seed: None,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl Settings {
    /// Initial controls; out-of-range values are clamped
    pub fn initial_controls(&self) -> Controls {
        Controls::new(self.source.mode, self.source.stream_url.clone())
            .with_refresh_interval_secs(self.display.refresh_interval_secs)
            .with_max_points(self.display.max_points)
    }
}

/// `config/monitor.*` if present, then `MONITOR__*` environment overrides
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/monitor").required(false))
        .add_source(
            config::Environment::with_prefix("MONITOR")
                .try_parsing(true)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not access {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid greenhouse document: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("plant name must not be empty")]
    EmptyPlantName,

    #[error("plant '{0}' already exists")]
    DuplicatePlant(String),

    #[error("plant '{0}' does not exist")]
    UnknownPlant(String),
}

/// The greenhouse configuration document (`greenhouse_info.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseConfig {
    #[serde(default)]
    pub sensors: Vec<String>,
    #[serde(default)]
    pub plants: Vec<String>,
    /// Keys this service does not interpret (thresholds, stdev_sensors, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GreenhouseConfig {
    pub fn to_session(&self) -> Session {
        Session::new(self.plants.clone(), self.sensors.clone())
    }

    /// Returns the stored (trimmed) name
    pub fn add_plant(&mut self, name: &str) -> Result<String, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyPlantName);
        }
        if self.plants.iter().any(|p| p == name) {
            return Err(ConfigError::DuplicatePlant(name.to_string()));
        }
        self.plants.push(name.to_string());
        Ok(name.to_string())
    }

    pub fn remove_plant(&mut self, name: &str) -> Result<(), ConfigError> {
        let index = self
            .plants
            .iter()
            .position(|p| p == name)
            .ok_or_else(|| ConfigError::UnknownPlant(name.to_string()))?;
        self.plants.remove(index);
        Ok(())
    }
}

/// File-backed greenhouse document; writes are serialized through a lock
pub struct GreenhouseConfigFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl GreenhouseConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<GreenhouseConfig, ConfigError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, config: &GreenhouseConfig) -> Result<(), ConfigError> {
        let mut json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        json.push('\n');

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })
    }

    pub async fn add_plant(&self, name: &str) -> Result<String, ConfigError> {
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        let added = config.add_plant(name)?;
        self.save(&config).await?;
        tracing::info!(plant = %added, "plant added");
        Ok(added)
    }

    pub async fn remove_plant(&self, name: &str) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        config.remove_plant(name)?;
        self.save(&config).await?;
        tracing::info!(plant = %name, "plant removed");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for GreenhouseConfigFile {
    async fn load_session(&self) -> anyhow::Result<Session> {
        let config = self
            .load()
            .await
            .with_context(|| format!("loading {}", self.path.display()))?;
        Ok(config.to_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "greenhouse-monitor-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_add_and_remove_plant() {
        let mut config = GreenhouseConfig::default();

        assert_eq!(config.add_plant("  Tomato_1 ").unwrap(), "Tomato_1");
        assert!(matches!(config.add_plant("Tomato_1"), Err(ConfigError::DuplicatePlant(_))));
        assert!(matches!(config.add_plant("   "), Err(ConfigError::EmptyPlantName)));

        config.remove_plant("Tomato_1").unwrap();
        assert!(config.plants.is_empty());
        assert!(matches!(config.remove_plant("Tomato_1"), Err(ConfigError::UnknownPlant(_))));
    }

    #[test]
    fn test_settings_defaults_and_clamping() {
        let mut settings = Settings::default();
        assert_eq!(settings.greenhouse_file, PathBuf::from("greenhouse_info.json"));
        assert_eq!(settings.source.mode, SourceMode::Snapshot);

        settings.display.max_points = 10_000;
        settings.display.refresh_interval_secs = 0.0;
        let controls = settings.initial_controls();
        assert_eq!(controls.max_points(), 500);
        assert_eq!(controls.refresh_interval_secs(), 0.1);
    }

    #[test]
    fn test_partial_settings_document() {
        let settings: Settings = serde_json::from_str(
            r#"{"source": {"mode": "stream", "stream_url": "http://10.0.0.2:8000/stream"}}"#,
        )
        .unwrap();

        assert_eq!(settings.source.mode, SourceMode::Stream);
        assert_eq!(settings.source.read_timeout_secs, 10);
        assert_eq!(settings.display.max_points, DEFAULT_MAX_POINTS);
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_file_round_trip_keeps_unknown_keys() {
        let path = temp_file("round-trip");
        tokio::fs::write(
            &path,
            r#"{"sensors": ["light"], "plants": ["Tomato_1"], "thresholds": {"light": [100, 900]}}"#,
        )
        .await
        .unwrap();

        let file = GreenhouseConfigFile::new(&path);
        file.add_plant("Basil_1").await.unwrap();
        file.remove_plant("Tomato_1").await.unwrap();

        let config = file.load().await.unwrap();
        assert_eq!(config.plants, vec!["Basil_1"]);
        assert_eq!(config.sensors, vec!["light"]);
        assert!(config.extra.contains_key("thresholds"));

        let session = file.load_session().await.unwrap();
        assert!(session.is_known_plant("Basil_1"));

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.contains("\n  \"sensors\""));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let file = GreenhouseConfigFile::new(temp_file("missing"));
        assert!(matches!(file.load().await, Err(ConfigError::Io { .. })));
        assert!(file.load_session().await.is_err());
    }
}
