// Static sensor metadata used for charting and synthetic generation

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub y_range: (f64, f64),
    pub synthetic_range: (f64, f64),
}

pub static KNOWN_METRICS: [MetricSpec; 4] = [
    MetricSpec {
        name: "soil_humidity",
        label: "Soil Humidity (%)",
        color: "#8B4513",
        y_range: (0.0, 100.0),
        synthetic_range: (40.0, 80.0),
    },
    MetricSpec {
        name: "air_humidity",
        label: "Air Humidity (%)",
        color: "#4A90E2",
        y_range: (0.0, 100.0),
        synthetic_range: (50.0, 90.0),
    },
    MetricSpec {
        name: "light",
        label: "Light (lux)",
        color: "#F5A623",
        y_range: (0.0, 1000.0),
        synthetic_range: (200.0, 800.0),
    },
    MetricSpec {
        name: "temperature",
        label: "Temperature (°C)",
        color: "#E74C3C",
        y_range: (10.0, 40.0),
        synthetic_range: (18.0, 32.0),
    },
];

pub fn lookup(name: &str) -> Option<&'static MetricSpec> {
    KNOWN_METRICS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_range_fits_display_range() {
        for spec in &KNOWN_METRICS {
            assert!(spec.synthetic_range.0 >= spec.y_range.0, "{}", spec.name);
            assert!(spec.synthetic_range.1 <= spec.y_range.1, "{}", spec.name);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("light").map(|s| s.label), Some("Light (lux)"));
        assert!(lookup("ph").is_none());
    }
}
