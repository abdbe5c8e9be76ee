//! Per-session view state.
//!
//! Handlers receive a [`RenderContext`] holding the session id and an injected
//! [`SessionStore`]. The store maps `(session_id, key)` to JSON values; the
//! service uses it to remember which station a session has selected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::stations::{self, Station};

pub const SELECTED_STATION_KEY: &str = "selected_station";

pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: &str, key: &str) -> Option<Value>;

    fn set(&self, session_id: &str, key: &str, value: Value);
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: Mutex<HashMap<(String, String), Value>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str, key: &str) -> Option<Value> {
        let values = match self.values.lock() {
            Ok(values) => values,
            Err(poisoned) => {
                warn!("Session store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        values
            .get(&(session_id.to_string(), key.to_string()))
            .cloned()
    }

    fn set(&self, session_id: &str, key: &str, value: Value) {
        let mut values = match self.values.lock() {
            Ok(values) => values,
            Err(poisoned) => {
                warn!("Session store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        values.insert((session_id.to_string(), key.to_string()), value);
    }
}

/// A session's chosen region and station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationSelection {
    pub region: String,
    pub station_id: String,
}

/// Context handed to each request that reads or writes session state.
#[derive(Clone)]
pub struct RenderContext {
    pub session_id: String,
    store: Arc<dyn SessionStore>,
}

impl RenderContext {
    pub fn new(session_id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            session_id: session_id.into(),
            store,
        }
    }

    /// Remember `station` as this session's selection.
    pub fn select_station(&self, station: &Station) {
        debug!(
            "Session {} selected station {} in {}",
            self.session_id, station.id, station.region
        );
        let selection = StationSelection {
            region: station.region.to_string(),
            station_id: station.id.to_string(),
        };
        match serde_json::to_value(&selection) {
            Ok(value) => self.store.set(&self.session_id, SELECTED_STATION_KEY, value),
            Err(e) => warn!("Failed to serialize station selection: {}", e),
        }
    }

    pub fn selection(&self) -> Option<StationSelection> {
        let value = self.store.get(&self.session_id, SELECTED_STATION_KEY)?;
        serde_json::from_value(value).ok()
    }

    /// The selected station, if one is set and still in the registry.
    pub fn selected_station(&self) -> Option<&'static Station> {
        let selection = self.selection()?;
        stations::find_station_id_in_region(&selection.region, &selection.station_id)
            .or_else(|| stations::find_station(&selection.station_id))
    }
}
