// Renderer that turns a plant window into chart data and publishes the latest frame
use crate::application::render_trigger::{Renderer, TriggerState};
use crate::domain::dashboard::Dashboard;
use crate::domain::metric::{self, KNOWN_METRICS};
use crate::domain::sample::Sample;
use crate::domain::telemetry::{ChartData, TimeSeriesPoint};
use std::collections::{BTreeSet, VecDeque};
use tokio::sync::watch;

pub struct ChartRenderer {
    dashboard: watch::Sender<Option<Dashboard>>,
    status: watch::Sender<TriggerState>,
}

impl ChartRenderer {
    /// The renderer plus receivers for the latest dashboard and trigger state
    pub fn channel() -> (
        Self,
        watch::Receiver<Option<Dashboard>>,
        watch::Receiver<TriggerState>,
    ) {
        let (dashboard, dashboard_rx) = watch::channel(None);
        let (status, status_rx) = watch::channel(TriggerState::Idle);
        (Self { dashboard, status }, dashboard_rx, status_rx)
    }
}

impl Renderer for ChartRenderer {
    fn render(&mut self, plant: &str, window: &VecDeque<Sample>) {
        let dashboard = build_dashboard(plant, window);
        tracing::debug!(
            plant = %plant,
            samples = dashboard.samples,
            charts = dashboard.charts.len(),
            "rendered window"
        );
        self.dashboard.send_replace(Some(dashboard));
    }

    fn report(&mut self, state: &TriggerState) {
        if let TriggerState::Error(message) = state {
            tracing::warn!(error = %message, "sample source stopped");
        }
        self.status.send_replace(state.clone());
    }
}

/// One chart per metric present in the window, known metrics first
pub fn build_dashboard(plant: &str, window: &VecDeque<Sample>) -> Dashboard {
    let present: BTreeSet<&str> = window
        .iter()
        .flat_map(|s| s.metrics.keys().map(String::as_str))
        .collect();

    let mut names: Vec<&str> = KNOWN_METRICS
        .iter()
        .map(|spec| spec.name)
        .filter(|name| present.contains(name))
        .collect();
    names.extend(
        present
            .iter()
            .copied()
            .filter(|name| metric::lookup(name).is_none()),
    );

    let charts = names
        .into_iter()
        .map(|name| chart_for(name, window))
        .collect();

    Dashboard::new(plant.to_string(), window.len(), charts)
}

fn chart_for(name: &str, window: &VecDeque<Sample>) -> ChartData {
    let points: Vec<TimeSeriesPoint> = window
        .iter()
        .filter_map(|s| {
            s.metric(name)
                .map(|v| TimeSeriesPoint::new(s.timestamp.timestamp_millis(), v))
        })
        .collect();

    let spec = metric::lookup(name);
    let label = spec.map_or(name, |s| s.label).to_string();
    let title = match points.last() {
        Some(p) => format!("{} - Current: {:.1}", label, p.value),
        None => label.clone(),
    };

    ChartData::new(
        name.to_string(),
        title,
        label,
        spec.map(|s| s.color.to_string()),
        spec.map(|s| s.y_range),
        points,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn sample(seq: i64, metrics: &[(&str, f64)]) -> Sample {
        let metrics: BTreeMap<String, f64> = metrics
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        Sample::new(
            "Tomato_1".to_string(),
            Utc.timestamp_millis_opt(seq * 1_000).unwrap(),
            metrics,
        )
    }

    #[test]
    fn test_build_dashboard() {
        let window: VecDeque<Sample> = vec![
            sample(1, &[("temperature", 20.0), ("light", 300.0), ("co2", 400.0)]),
            sample(2, &[("temperature", 21.34), ("light", 310.0)]),
        ]
        .into();

        let dashboard = build_dashboard("Tomato_1", &window);
        assert_eq!(dashboard.title, "Monitoring: Tomato_1");
        assert_eq!(dashboard.samples, 2);

        let ids: Vec<&str> = dashboard.charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["light", "temperature", "co2"]);

        let temperature = &dashboard.charts[1];
        assert_eq!(temperature.title, "Temperature (°C) - Current: 21.3");
        assert_eq!(temperature.current, Some(21.34));
        assert_eq!((temperature.y_min, temperature.y_max), (Some(10.0), Some(40.0)));
        assert_eq!(temperature.color.as_deref(), Some("#E74C3C"));
        assert_eq!(
            temperature.points,
            vec![
                TimeSeriesPoint::new(1_000, 20.0),
                TimeSeriesPoint::new(2_000, 21.34)
            ]
        );

        let co2 = &dashboard.charts[2];
        assert_eq!(co2.label, "co2");
        assert_eq!(co2.points.len(), 1);
        assert!(co2.y_min.is_none());
    }

    #[test]
    fn test_render_publishes_latest() {
        let (mut renderer, dashboard_rx, status_rx) = ChartRenderer::channel();
        assert!(dashboard_rx.borrow().is_none());

        let window: VecDeque<Sample> = vec![sample(1, &[("light", 1.0)])].into();
        renderer.render("Tomato_1", &window);
        renderer.report(&TriggerState::Streaming);

        assert_eq!(
            dashboard_rx.borrow().as_ref().map(|d| d.plant.as_str()),
            Some("Tomato_1")
        );
        assert_eq!(*status_rx.borrow(), TriggerState::Streaming);
    }
}
