// Synthetic sample source - random readings for every configured plant
use crate::application::sample_source::{SampleBatch, SampleStream, SourceError};
use crate::domain::metric::{self, MetricSpec};
use crate::domain::sample::RawSample;
use crate::domain::session::Session;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticStyle {
    /// Every plant, one shared timestamp
    Snapshot,
    /// One randomly chosen plant per pull
    Continuous,
}

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    plants: Vec<String>,
    metrics: Vec<&'static MetricSpec>,
    style: SyntheticStyle,
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new(session: &Session, style: SyntheticStyle) -> Self {
        let metrics = session
            .sensors()
            .iter()
            .filter_map(|name| {
                let spec = metric::lookup(name);
                if spec.is_none() {
                    tracing::warn!(sensor = %name, "no synthetic range for sensor, it will stay empty");
                }
                spec
            })
            .collect();

        Self {
            plants: session.plants().to_vec(),
            metrics,
            style,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// One sample per plant, all sharing `timestamp`
    pub fn snapshot<R: Rng>(&self, timestamp: DateTime<Utc>, rng: &mut R) -> SampleBatch {
        self.plants
            .iter()
            .map(|plant| self.sample_for(plant, timestamp, rng))
            .collect()
    }

    /// A single sample for a random plant, empty when no plants are configured
    pub fn pick<R: Rng>(&self, timestamp: DateTime<Utc>, rng: &mut R) -> SampleBatch {
        self.plants
            .choose(rng)
            .map(|plant| vec![self.sample_for(plant, timestamp, rng)])
            .unwrap_or_default()
    }

    fn sample_for<R: Rng>(&self, plant: &str, timestamp: DateTime<Utc>, rng: &mut R) -> RawSample {
        self.metrics.iter().fold(RawSample::new(plant, timestamp), |sample, spec| {
            let (low, high) = spec.synthetic_range;
            sample.with_metric(spec.name, rng.gen_range(low..=high))
        })
    }

    /// Unbounded stream; each pull produces a fresh batch
    pub fn into_stream(self) -> SampleStream {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let source = self;
        Box::pin(async_stream::stream! {
            loop {
                let now = Utc::now();
                let batch = match source.style {
                    SyntheticStyle::Snapshot => source.snapshot(now, &mut rng),
                    SyntheticStyle::Continuous => source.pick(now, &mut rng),
                };
                yield Ok::<_, SourceError>(batch);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::Value;

    fn session() -> Session {
        Session::new(
            vec!["Tomato_1".to_string(), "Basil_1".to_string(), "Mint_2".to_string()],
            vec![
                "soil_humidity".to_string(),
                "air_humidity".to_string(),
                "light".to_string(),
                "temperature".to_string(),
            ],
        )
    }

    fn value(sample: &RawSample, name: &str) -> f64 {
        sample.fields.get(name).and_then(Value::as_f64).unwrap()
    }

    #[test]
    fn test_snapshot_covers_each_plant_within_ranges() {
        let source = SyntheticSource::new(&session(), SyntheticStyle::Snapshot);
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();

        for _ in 0..50 {
            let batch = source.snapshot(now, &mut rng);
            assert_eq!(batch.len(), 3);

            let plants: Vec<_> = batch.iter().filter_map(|s| s.entity_id.as_deref()).collect();
            assert_eq!(plants, vec!["Tomato_1", "Basil_1", "Mint_2"]);

            for sample in &batch {
                assert_eq!(sample.timestamp, batch[0].timestamp);
                for spec in &metric::KNOWN_METRICS {
                    let v = value(sample, spec.name);
                    assert!(
                        v >= spec.synthetic_range.0 && v <= spec.synthetic_range.1,
                        "{} out of range: {}",
                        spec.name,
                        v
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_sensor_is_not_generated() {
        let session = Session::new(
            vec!["Tomato_1".to_string()],
            vec!["light".to_string(), "ph".to_string()],
        );
        let source = SyntheticSource::new(&session, SyntheticStyle::Snapshot);
        let batch = source.snapshot(Utc::now(), &mut StdRng::seed_from_u64(1));

        assert!(batch[0].fields.contains_key("light"));
        assert!(!batch[0].fields.contains_key("ph"));
    }

    #[test]
    fn test_pick_without_plants() {
        let session = Session::new(vec![], vec!["light".to_string()]);
        let source = SyntheticSource::new(&session, SyntheticStyle::Continuous);
        assert!(source.pick(Utc::now(), &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[tokio::test]
    async fn test_continuous_stream_yields_single_known_plant() {
        let session = session();
        let mut stream = SyntheticSource::new(&session, SyntheticStyle::Continuous)
            .with_seed(Some(42))
            .into_stream();

        for _ in 0..20 {
            let batch = stream.next().await.unwrap().unwrap();
            assert_eq!(batch.len(), 1);
            let plant = batch[0].entity_id.as_deref().unwrap();
            assert!(session.is_known_plant(plant));
        }
    }
}
