use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::common::{Weather, ZoneId};
use crate::graph::{Graph, SharedGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Rain,
    Storm,
    Wind,
    Fog,
}

impl Condition {
    const WEIGHTED: [(Condition, f64); 4] = [
        (Condition::Rain, 0.3),
        (Condition::Storm, 0.1),
        (Condition::Wind, 0.3),
        (Condition::Fog, 0.3),
    ];

    fn component_mut(self, weather: &mut Weather) -> &mut f64 {
        match self {
            Condition::Rain => &mut weather.rain,
            Condition::Storm => &mut weather.storm,
            Condition::Wind => &mut weather.wind,
            Condition::Fog => &mut weather.fog,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Weather {
        zone: String,
        condition: Condition,
        value: f64,
    },
    Production {
        zone: String,
        units: u32,
    },
    RouteState {
        from: String,
        to: String,
        blocked: bool,
    },
    Population {
        zone: String,
        from: u32,
        to: u32,
    },
    VehicleArrived {
        zone: String,
        tag: String,
    },
    VehicleLeft {
        zone: String,
        tag: String,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Weather {
                zone,
                condition,
                value,
            } => write!(f, "weather in {zone}: {condition:?} is now {value:.2}"),
            Change::Production { zone, units } => {
                write!(f, "{zone} produced {units} units of medication")
            }
            Change::RouteState { from, to, blocked } => write!(
                f,
                "route {from} - {to} is now {}",
                if *blocked { "blocked" } else { "open" }
            ),
            Change::Population { zone, from, to } => {
                write!(f, "population of {zone} changed from {from} to {to}")
            }
            Change::VehicleArrived { zone, tag } => write!(f, "{tag} arrived at {zone}"),
            Change::VehicleLeft { zone, tag } => write!(f, "{tag} left {zone}"),
        }
    }
}

/// Random changes to weather, stock, route blockage, population and vehicle
/// availability, one per call.
pub struct DynamicConditions {
    rng: StdRng,
}

impl DynamicConditions {
    pub fn new(seed: u64) -> Self {
        DynamicConditions {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Applies one random change and refreshes the heuristics. Returns `None`
    /// when the drawn change had nothing to act on.
    pub fn perturb(&mut self, graph: &mut Graph) -> Option<Change> {
        if graph.is_empty() {
            return None;
        }

        let zone = self.rng.gen_range(0..graph.len());
        let roll: f64 = self.rng.gen();
        let change = if roll < 0.4 {
            self.change_weather(graph, zone)
        } else if roll < 0.6 {
            Some(self.produce(graph, zone))
        } else if roll < 0.75 {
            self.toggle_route(graph, zone)
        } else if roll < 0.9 {
            Some(self.change_population(graph, zone))
        } else {
            self.move_vehicle(graph, zone)
        };

        match &change {
            Some(change) => {
                info!("[dynamic] {change}");
                graph.refresh_heuristics();
            }
            None => debug!("[dynamic] nothing changed"),
        }
        change
    }

    fn change_weather(&mut self, graph: &mut Graph, zone: ZoneId) -> Option<Change> {
        let &(condition, _) = Condition::WEIGHTED
            .choose_weighted(&mut self.rng, |(_, weight)| *weight)
            .ok()?;
        let value: f64 = self.rng.gen();

        *condition.component_mut(&mut graph.zone_mut(zone).weather) = value;
        shorten_time_window(graph, zone);
        Some(Change::Weather {
            zone: graph.zone(zone).name.clone(),
            condition,
            value,
        })
    }

    fn produce(&mut self, graph: &mut Graph, zone: ZoneId) -> Change {
        let units = self.rng.gen_range(1..=300);
        let zone = graph.zone_mut(zone);
        zone.resource_stock = zone.resource_stock.saturating_add(units);
        Change::Production {
            zone: zone.name.clone(),
            units,
        }
    }

    fn toggle_route(&mut self, graph: &mut Graph, zone: ZoneId) -> Option<Change> {
        let route = graph.routes_from(zone).choose(&mut self.rng)?;
        let (to, blocked) = (route.to, !route.blocked);
        graph.set_route_blocked(zone, to, blocked);
        shorten_time_window(graph, zone);
        shorten_time_window(graph, to);
        Some(Change::RouteState {
            from: graph.zone(zone).name.clone(),
            to: graph.zone(to).name.clone(),
            blocked,
        })
    }

    fn change_population(&mut self, graph: &mut Graph, zone: ZoneId) -> Change {
        let delta: i64 = self.rng.gen_range(-10..=50);
        let zone = graph.zone_mut(zone);
        let from = zone.population;
        zone.population = (i64::from(from) + delta).clamp(0, i64::from(u32::MAX)) as u32;
        Change::Population {
            zone: zone.name.clone(),
            from,
            to: zone.population,
        }
    }

    fn move_vehicle(&mut self, graph: &mut Graph, zone: ZoneId) -> Option<Change> {
        if self.rng.gen_bool(0.5) {
            let tags: Vec<String> = graph.vehicle_tags().map(str::to_string).collect();
            let tag = tags.choose(&mut self.rng)?.clone();
            let zone = graph.zone_mut(zone);
            zone.vehicles.push(tag.clone());
            Some(Change::VehicleArrived {
                zone: zone.name.clone(),
                tag,
            })
        } else {
            let zone = graph.zone_mut(zone);
            if zone.vehicles.is_empty() {
                return None;
            }
            let index = self.rng.gen_range(0..zone.vehicles.len());
            let tag = zone.vehicles.remove(index);
            Some(Change::VehicleLeft {
                zone: zone.name.clone(),
                tag,
            })
        }
    }
}

/// Bad weather and route changes cost a zone `weather.impact()` hours of its
/// time window, down to 0 (expired).
fn shorten_time_window(graph: &mut Graph, zone: ZoneId) {
    let zone = graph.zone_mut(zone);
    let impact = zone.weather.impact();
    if impact <= 0.0 || zone.is_expired() {
        return;
    }
    let before = zone.time_window;
    zone.time_window = (before - impact).max(0.0);
    info!(
        "[dynamic] time window of {} shrinks from {before:.2} to {:.2}",
        zone.name, zone.time_window
    );
}

/// Applies a random change to the shared graph every `interval` until the
/// returned task is aborted.
pub fn spawn_dynamic_conditions(shared: SharedGraph, interval: Duration, seed: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut conditions = DynamicConditions::new(seed);
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            shared.write(|graph| conditions.perturb(graph));
        }
    })
}
