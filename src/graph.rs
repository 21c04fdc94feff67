mod shared;

pub use shared::SharedGraph;

use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, bail, Result};
use tracing::trace;

use crate::common::{Route, VehicleType, Zone, ZoneId};

/// Undirected relief map: zones, symmetric routes and the vehicle catalog.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    zones: Vec<Zone>,
    routes: Vec<Vec<Route>>, // routes[zone] lists outgoing routes in insertion order
    vehicles: BTreeMap<String, VehicleType>,
    heuristic: Vec<f64>,
    index: HashMap<String, ZoneId>,
}

impl Graph {
    pub fn new(catalog: impl IntoIterator<Item = VehicleType>) -> Self {
        let vehicles = catalog
            .into_iter()
            .map(|vehicle| (vehicle.tag.clone(), vehicle))
            .collect();
        Graph {
            vehicles,
            ..Default::default()
        }
    }

    pub fn add_zone(&mut self, mut zone: Zone) -> Result<ZoneId> {
        zone.name = zone.name.to_uppercase();
        if self.index.contains_key(&zone.name) {
            bail!("duplicate zone {}", zone.name);
        }
        if let Some(tag) = zone.vehicles.iter().find(|tag| !self.vehicles.contains_key(*tag)) {
            bail!("zone {} stations unknown vehicle type {tag}", zone.name);
        }

        let id = self.zones.len();
        self.index.insert(zone.name.clone(), id);
        self.zones.push(zone);
        self.routes.push(Vec::new());
        self.refresh_heuristics();
        Ok(id)
    }

    pub fn add_route(
        &mut self,
        from: &str,
        to: &str,
        weight: f64,
        blocked: bool,
        allowed: Vec<String>,
    ) -> Result<()> {
        let from_id = self
            .zone_id(from)
            .ok_or_else(|| anyhow!("route endpoint {from} is not a zone"))?;
        let to_id = self
            .zone_id(to)
            .ok_or_else(|| anyhow!("route endpoint {to} is not a zone"))?;
        if from_id == to_id {
            bail!("route {from} -> {to} is a self loop");
        }
        if weight.is_nan() || weight <= 0.0 {
            bail!("route {from} -> {to} must have a positive weight, got {weight}");
        }
        if let Some(tag) = allowed.iter().find(|tag| !self.vehicles.contains_key(*tag)) {
            bail!("route {from} -> {to} allows unknown vehicle type {tag}");
        }

        self.routes[from_id].push(Route {
            to: to_id,
            weight,
            blocked,
            allowed: allowed.clone(),
        });
        self.routes[to_id].push(Route {
            to: from_id,
            weight,
            blocked,
            allowed,
        });
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn zone_id(&self, name: &str) -> Option<ZoneId> {
        self.index.get(&name.to_uppercase()).copied()
    }

    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id]
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> &mut Zone {
        &mut self.zones[id]
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn vehicle(&self, tag: &str) -> Option<&VehicleType> {
        self.vehicles.get(tag)
    }

    pub fn vehicle_tags(&self) -> impl Iterator<Item = &str> {
        self.vehicles.keys().map(String::as_str)
    }

    pub fn routes_from(&self, zone: ZoneId) -> &[Route] {
        &self.routes[zone]
    }

    pub fn route(&self, from: ZoneId, to: ZoneId) -> Option<&Route> {
        self.routes.get(from)?.iter().find(|route| route.to == to)
    }

    /// Routes out of `zone` the given vehicle type may drive, in stored order.
    pub fn get_neighbors<'a>(
        &'a self,
        zone: ZoneId,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes[zone]
            .iter()
            .filter(move |route| route.is_usable_by(tag))
    }

    /// Sets the blockage of the route between `a` and `b` in both directions.
    /// Returns false if no such route exists.
    pub fn set_route_blocked(&mut self, a: ZoneId, b: ZoneId, blocked: bool) -> bool {
        let mut found = false;
        for (from, to) in [(a, b), (b, a)] {
            for route in self.routes[from].iter_mut().filter(|route| route.to == to) {
                route.blocked = blocked;
                found = true;
            }
        }
        found
    }

    /// Zone with the lowest priority value; ties resolve to the first stored.
    pub fn highest_priority_zone(&self) -> Option<ZoneId> {
        self.most_urgent_zone(|_| true)
    }

    pub fn most_urgent_zone(&self, mut eligible: impl FnMut(ZoneId) -> bool) -> Option<ZoneId> {
        let mut best: Option<(ZoneId, f64)> = None;
        for (id, zone) in self.zones.iter().enumerate() {
            if !eligible(id) {
                continue;
            }
            if let Some(priority) = zone.priority() {
                if best.map_or(true, |(_, current)| priority < current) {
                    best = Some((id, priority));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Recomputes the urgency heuristic of every zone. Must run after any
    /// change to population, time window or weather.
    pub fn refresh_heuristics(&mut self) {
        let target = self.highest_priority_zone();
        self.heuristic = self
            .zones
            .iter()
            .map(|zone| match (target, zone.priority()) {
                (Some(target), Some(priority)) => zone.distance_to(&self.zones[target]) * priority,
                _ => f64::INFINITY,
            })
            .collect();
        trace!("heuristics refreshed, most urgent zone: {target:?}");
    }

    /// Urgency-biased distance of `zone`: straight-line distance to the most
    /// urgent zone scaled by the zone's own priority. Not a lower bound on
    /// remaining route cost.
    pub fn heuristic(&self, zone: ZoneId) -> f64 {
        self.heuristic.get(zone).copied().unwrap_or(f64::INFINITY)
    }

    pub fn path_names(&self, path: &[ZoneId]) -> Vec<String> {
        path.iter().map(|&id| self.zones[id].name.clone()).collect()
    }
}
