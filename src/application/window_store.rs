// Windowed buffer store - one bounded, arrival-ordered buffer per plant
use crate::domain::controls::DEFAULT_MAX_POINTS;
use crate::domain::sample::Sample;
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct WindowStore {
    windows: HashMap<String, VecDeque<Sample>>,
    max_points: usize,
    resized: bool,
}

impl WindowStore {
    pub fn new(max_points: usize) -> Self {
        Self {
            windows: HashMap::new(),
            max_points: max_points.max(1),
            resized: false,
        }
    }

    /// New bound; existing windows are trimmed on the next append
    pub fn set_max_points(&mut self, max_points: usize) {
        let max_points = max_points.max(1);
        if max_points != self.max_points {
            self.max_points = max_points;
            self.resized = true;
        }
    }

    pub fn append(&mut self, entity_id: &str, sample: Sample) {
        if self.resized {
            let bound = self.max_points;
            for window in self.windows.values_mut() {
                trim(window, bound);
            }
            self.resized = false;
        }

        let window = self.windows.entry(entity_id.to_string()).or_default();
        window.push_back(sample);
        trim(window, self.max_points);
    }

    /// Samples for a plant, oldest first. Empty for a plant never seen.
    #[cfg(test)]
    pub fn get(&self, entity_id: &str) -> Vec<Sample> {
        self.window(entity_id)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn window(&self, entity_id: &str) -> Option<&VecDeque<Sample>> {
        self.windows.get(entity_id)
    }

    #[cfg(test)]
    pub fn len(&self, entity_id: &str) -> usize {
        self.window(entity_id).map_or(0, VecDeque::len)
    }

    /// Drop windows of plants that are no longer configured
    pub fn retain_plants(&mut self, plants: &[String]) {
        self.windows
            .retain(|plant, _| plants.iter().any(|p| p == plant));
    }
}

impl Default for WindowStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS)
    }
}

fn trim(window: &mut VecDeque<Sample>, bound: usize) {
    if window.len() > bound {
        let excess = window.len() - bound;
        window.drain(..excess);
    }
}
