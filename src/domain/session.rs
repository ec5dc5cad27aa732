// Session - the plant and sensor sets known to the monitor

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    plants: Vec<String>,
    sensors: Vec<String>,
}

impl Session {
    pub fn new(plants: Vec<String>, sensors: Vec<String>) -> Self {
        Self { plants, sensors }
    }

    pub fn plants(&self) -> &[String] {
        &self.plants
    }

    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    pub fn is_known_plant(&self, name: &str) -> bool {
        self.plants.iter().any(|p| p == name)
    }

    pub fn is_known_sensor(&self, name: &str) -> bool {
        self.sensors.iter().any(|s| s == name)
    }

    /// The plant to chart: the explicit selection when it is known, else the first plant
    pub fn resolve_selection<'a>(&'a self, selected: Option<&'a str>) -> Option<&'a str> {
        match selected {
            Some(name) if self.is_known_plant(name) => Some(name),
            _ => self.plants.first().map(String::as_str),
        }
    }
}
