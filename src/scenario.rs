use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::common::{VehicleType, Weather, Zone};
use crate::graph::Graph;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

fn default_time_window() -> f64 {
    24.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    #[serde(default)]
    pub population: u32,
    #[serde(default = "default_time_window")]
    pub time_window: f64,
    #[serde(default)]
    pub resource_stock: u32,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub vehicles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub origin: String,
    pub destination: String,
    pub weight: f64,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub allowed_vehicle_types: Vec<String>,
}

/// Serialized relief map: zones, routes and the vehicle catalog keyed by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub zones: Vec<ZoneSpec>,
    pub routes: Vec<RouteSpec>,
    pub vehicles: BTreeMap<String, VehicleType>,
}

impl Scenario {
    /// Reads JSON, or YAML when the extension is `.yaml`/`.yml`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Scenario> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read scenario {}", path.display()))?;

        let scenario = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&contents)
                .with_context(|| format!("invalid scenario yaml {}", path.display()))?,
            _ => serde_json::from_str(&contents)
                .with_context(|| format!("invalid scenario json {}", path.display()))?,
        };
        Ok(scenario)
    }

    pub fn into_graph(self) -> Result<Graph> {
        for (tag, vehicle) in &self.vehicles {
            for (field, value) in [
                ("speed", vehicle.speed),
                ("fuel budget", vehicle.fuel_budget),
                ("cost factor", vehicle.cost_factor),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    bail!("vehicle type {tag} must have a positive {field}, got {value}");
                }
            }
        }
        for zone in &self.zones {
            let weather = &zone.weather;
            for (field, value) in [
                ("rain", weather.rain),
                ("storm", weather.storm),
                ("wind", weather.wind),
                ("fog", weather.fog),
                ("time window", zone.time_window),
            ] {
                if !value.is_finite() || value < 0.0 {
                    bail!("zone {} must have a non-negative {field}, got {value}", zone.name);
                }
            }
        }
        let catalog = self.vehicles.into_iter().map(|(tag, vehicle)| VehicleType {
            tag,
            ..vehicle
        });
        let mut graph = Graph::new(catalog);

        for spec in self.zones {
            let name = spec.name.clone();
            graph
                .add_zone(Zone {
                    name: spec.name,
                    population: spec.population,
                    time_window: spec.time_window,
                    resource_stock: spec.resource_stock,
                    weather: spec.weather,
                    coordinates: (spec.coordinates.x, spec.coordinates.y),
                    vehicles: spec.vehicles,
                })
                .with_context(|| format!("invalid zone {name}"))?;
        }

        for route in self.routes {
            graph
                .add_route(
                    &route.origin,
                    &route.destination,
                    route.weight,
                    route.blocked,
                    route.allowed_vehicle_types,
                )
                .context("invalid route")?;
        }

        info!(
            "Loaded {} zones and {} vehicle types",
            graph.len(),
            graph.vehicle_tags().count()
        );
        Ok(graph)
    }
}

pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph> {
    Scenario::load_from_file(path)?.into_graph()
}
