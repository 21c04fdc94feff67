use serde::{Deserialize, Serialize};

pub type ZoneId = usize;

/// Ordered zone indices from origin to destination, origin first.
pub type Path = Vec<ZoneId>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub rain: f64,
    pub storm: f64,
    pub wind: f64,
    pub fog: f64,
}

impl Weather {
    pub fn impact(&self) -> f64 {
        self.rain + self.storm + self.wind + self.fog
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub population: u32,
    pub time_window: f64, // hours left, 0 means expired
    pub resource_stock: u32,
    pub weather: Weather,
    pub coordinates: (f64, f64),
    pub vehicles: Vec<String>, // one entry per stationed vehicle, by type tag
}

impl Zone {
    pub fn new(name: &str) -> Self {
        Zone {
            name: name.to_uppercase(),
            population: 0,
            time_window: 24.0,
            resource_stock: 0,
            weather: Weather::default(),
            coordinates: (0.0, 0.0),
            vehicles: Vec::new(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.time_window <= 0.0
    }

    /// Urgency of the zone, lower is more urgent. `None` when the zone has
    /// nobody left to serve or its window has expired.
    pub fn priority(&self) -> Option<f64> {
        if self.population == 0 || self.is_expired() {
            return None;
        }
        Some(self.time_window / (self.population as f64 + self.weather.impact()))
    }

    /// Distinct vehicle tags stationed here, in the order they were stationed.
    pub fn vehicle_types(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in &self.vehicles {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }
        tags
    }

    pub fn distance_to(&self, other: &Zone) -> f64 {
        let dx = self.coordinates.0 - other.coordinates.0;
        let dy = self.coordinates.1 - other.coordinates.1;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub to: ZoneId,
    pub weight: f64,
    pub blocked: bool,
    pub allowed: Vec<String>,
}

impl Route {
    pub fn is_usable_by(&self, tag: &str) -> bool {
        !self.blocked && self.allowed.iter().any(|allowed| allowed == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    #[serde(default)]
    pub tag: String,
    pub cost_factor: f64,
    pub fuel_budget: f64,
    pub speed: f64,
    pub cargo_capacity: u32,
}
