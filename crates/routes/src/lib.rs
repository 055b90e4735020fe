pub mod cursor;
pub mod presets;
pub mod source;

pub use cursor::*;
pub use presets::*;
pub use source::*;

use std::collections::BTreeMap;

use foundation::Coordinate;
use serde::{Deserialize, Serialize};

/// One recorded point of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    /// Opaque timestamp string as stored by the backend.
    #[serde(default)]
    pub timestamp: String,
}

impl LocationData {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Ordered points sharing one route identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub location_id: String,
    #[serde(default)]
    pub locations: Vec<LocationData>,
}

impl LocationGroup {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.locations.iter().map(LocationData::coordinate).collect()
    }
}

/// Envelope returned by the route endpoint.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroupsResponse {
    #[serde(default)]
    pub location_groups: Vec<LocationGroup>,
}

#[derive(Debug)]
pub enum RouteError {
    NotFound(String),
    Http(u16),
    Transport(reqwest::Error),
    Corrupt(String),
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::NotFound(id) => write!(f, "route not found: {id}"),
            RouteError::Http(code) => write!(f, "route endpoint returned HTTP {code}"),
            RouteError::Transport(err) => write!(f, "route request failed: {err}"),
            RouteError::Corrupt(msg) => write!(f, "route data corrupt: {msg}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

pub fn find_group<'a>(groups: &'a [LocationGroup], location_id: &str) -> Option<&'a LocationGroup> {
    groups.iter().find(|g| g.location_id == location_id)
}

pub fn parse_groups(json: &str) -> Result<LocationGroupsResponse, RouteError> {
    serde_json::from_str(json).map_err(|e| RouteError::Corrupt(e.to_string()))
}

/// Local route storage keyed by `location_id`.
pub trait RouteStore {
    fn list(&self) -> Vec<LocationGroup>;
    fn get(&self, location_id: &str) -> Option<LocationGroup>;
    fn upsert(&mut self, group: LocationGroup);
    fn delete(&mut self, location_id: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryRouteStore {
    groups: BTreeMap<String, LocationGroup>,
}

impl InMemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_response(response: LocationGroupsResponse) -> Self {
        let mut store = Self::new();
        for group in response.location_groups {
            store.upsert(group);
        }
        store
    }

    pub fn require(&self, location_id: &str) -> Result<LocationGroup, RouteError> {
        self.get(location_id)
            .ok_or_else(|| RouteError::NotFound(location_id.to_string()))
    }
}

impl RouteStore for InMemoryRouteStore {
    fn list(&self) -> Vec<LocationGroup> {
        self.groups.values().cloned().collect()
    }

    fn get(&self, location_id: &str) -> Option<LocationGroup> {
        self.groups.get(location_id).cloned()
    }

    fn upsert(&mut self, group: LocationGroup) {
        self.groups.insert(group.location_id.clone(), group);
    }

    fn delete(&mut self, location_id: &str) -> bool {
        self.groups.remove(location_id).is_some()
    }
}
