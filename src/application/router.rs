// Sample router - validates raw samples against the session
use crate::domain::sample::{RawSample, Sample};
use crate::domain::session::Session;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub struct SampleRouter<'a> {
    session: &'a Session,
}

impl<'a> SampleRouter<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Resolve the target plant. `None` when the plant is missing or unknown.
    pub fn route(&self, raw: RawSample) -> Option<(String, Sample)> {
        self.route_at(raw, Utc::now())
    }

    pub fn route_at(&self, raw: RawSample, received_at: DateTime<Utc>) -> Option<(String, Sample)> {
        let entity_id = raw.entity_id?;
        if !self.session.is_known_plant(&entity_id) {
            tracing::trace!(plant = %entity_id, "dropping sample for unknown plant");
            return None;
        }

        let timestamp = raw
            .timestamp
            .and_then(|ts| ts.resolve(received_at))
            .unwrap_or(received_at);

        let metrics: BTreeMap<String, f64> = raw
            .fields
            .into_iter()
            .filter(|(name, _)| self.session.is_known_sensor(name))
            .filter_map(|(name, value)| value.as_f64().map(|v| (name, v)))
            .collect();

        let sample = Sample::new(entity_id.clone(), timestamp, metrics);
        Some((entity_id, sample))
    }
}
