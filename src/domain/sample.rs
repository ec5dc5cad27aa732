// Sensor sample domain models
use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Timestamp as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Normalize to UTC. Clock-only values ("14:05", "14:05:30") are read as
    /// local time on the day of `received_at`.
    pub fn resolve(&self, received_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            RawTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                    return Some(parsed.with_timezone(&Utc));
                }

                let clock = NaiveTime::parse_from_str(text, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
                    .ok()?;

                received_at
                    .with_timezone(&Local)
                    .date_naive()
                    .and_time(clock)
                    .and_local_timezone(Local)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
            }
        }
    }
}

/// A record produced by a sample source, not yet validated against the session
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSample {
    #[serde(default, alias = "plant")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Timestamps of an unexpected shape are dropped rather than failing the record
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<RawTimestamp>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl RawSample {
    pub fn new(entity_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            timestamp: Some(RawTimestamp::Millis(timestamp.timestamp_millis())),
            fields: Map::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        if let Some(number) = serde_json::Number::from_f64(value) {
            self.fields.insert(name.into(), Value::Number(number));
        }
        self
    }
}

/// A validated sample routed to a known plant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: BTreeMap<String, f64>,
}

impl Sample {
    pub fn new(entity_id: String, timestamp: DateTime<Utc>, metrics: BTreeMap<String, f64>) -> Self {
        Self {
            entity_id,
            timestamp,
            metrics,
        }
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_deserialize_plant_alias() {
        let raw: RawSample = serde_json::from_str(
            r#"{"plant": "Tomato_1", "timestamp": "12:30", "light": 410.5}"#,
        )
        .unwrap();

        assert_eq!(raw.entity_id.as_deref(), Some("Tomato_1"));
        assert_eq!(raw.timestamp, Some(RawTimestamp::Text("12:30".to_string())));
        assert_eq!(raw.fields.get("light").and_then(Value::as_f64), Some(410.5));
    }

    #[test]
    fn test_deserialize_without_entity() {
        let raw: RawSample = serde_json::from_str(r#"{"light": 1.0}"#).unwrap();
        assert!(raw.entity_id.is_none());
        assert!(raw.timestamp.is_none());
    }

    #[test]
    fn test_deserialize_odd_timestamp_keeps_record() {
        let raw: RawSample =
            serde_json::from_str(r#"{"entity_id": "Basil_1", "timestamp": true}"#).unwrap();
        assert_eq!(raw.entity_id.as_deref(), Some("Basil_1"));
        assert!(raw.timestamp.is_none());
    }

    #[test]
    fn test_resolve_millis_and_rfc3339() {
        let received = Utc::now();
        let millis = RawTimestamp::Millis(1_700_000_000_000);
        assert_eq!(
            millis.resolve(received).unwrap().timestamp_millis(),
            1_700_000_000_000
        );

        let text = RawTimestamp::Text("2024-05-01T10:15:00+02:00".to_string());
        let resolved = text.resolve(received).unwrap();
        assert_eq!(resolved.to_rfc3339(), "2024-05-01T08:15:00+00:00");
    }

    #[test]
    fn test_resolve_clock_time_is_local() {
        let received = Utc::now();
        let resolved = RawTimestamp::Text("07:45".to_string())
            .resolve(received)
            .unwrap()
            .with_timezone(&Local);

        assert_eq!((resolved.hour(), resolved.minute()), (7, 45));
        assert_eq!(
            resolved.date_naive(),
            received.with_timezone(&Local).date_naive()
        );
    }

    #[test]
    fn test_resolve_garbage() {
        let raw = RawTimestamp::Text("yesterday-ish".to_string());
        assert!(raw.resolve(Utc::now()).is_none());
    }

    #[test]
    fn test_with_metric_skips_non_finite() {
        let raw = RawSample::new("Basil_1", Utc::now())
            .with_metric("light", 300.0)
            .with_metric("temperature", f64::NAN);

        assert!(raw.fields.contains_key("light"));
        assert!(!raw.fields.contains_key("temperature"));
    }
}
