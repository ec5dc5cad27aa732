// Chart data domain models
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// One metric of one plant, ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub label: String,
    pub color: Option<String>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub current: Option<f64>,
    pub points: Vec<TimeSeriesPoint>,
}

impl ChartData {
    pub fn new(
        id: String,
        title: String,
        label: String,
        color: Option<String>,
        y_range: Option<(f64, f64)>,
        points: Vec<TimeSeriesPoint>,
    ) -> Self {
        let current = points.last().map(|p| p.value);
        Self {
            id,
            title,
            label,
            color,
            y_min: y_range.map(|(min, _)| min),
            y_max: y_range.map(|(_, max)| max),
            current,
            points,
        }
    }
}
