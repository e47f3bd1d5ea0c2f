use std::{collections::BTreeMap, path::Path};

use anyhow::{bail, Context};
use msgs::{BusId, Location};

const SEED_FLEET: &str = include_str!("../fleet.json");

/// Every bus the server tracks, kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    locations: BTreeMap<BusId, Location>,
}

impl Fleet {
    pub fn new() -> Fleet {
        Fleet::default()
    }

    /// The bundled fleet: 34 buses parked at their depots, none locked.
    pub fn seeded() -> anyhow::Result<Fleet> {
        Fleet::from_json(SEED_FLEET).context("bundled fleet is invalid")
    }

    pub fn load(path: &Path) -> anyhow::Result<Fleet> {
        let json = std::fs::read_to_string(path).with_context(|| format!("could not read fleet file {}", path.display()))?;
        Fleet::from_json(&json).with_context(|| format!("could not load fleet file {}", path.display()))
    }

    pub fn from_json(json: &str) -> anyhow::Result<Fleet> {
        let locations = serde_json::from_str::<Vec<Location>>(json)?;
        let mut fleet = Fleet::new();
        for location in locations {
            if fleet.locations.contains_key(&location.id) {
                bail!("duplicate bus id {}", location.id);
            }
            if fleet.bus_number_taken(&location.bus_number, location.id) {
                bail!("duplicate bus number {}", location.bus_number);
            }
            fleet.locations.insert(location.id, location);
        }
        Ok(fleet)
    }

    pub fn get(&self, id: BusId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn get_mut(&mut self, id: BusId) -> Option<&mut Location> {
        self.locations.get_mut(&id)
    }

    /// True if a bus other than `except` already uses `bus_number`.
    pub fn bus_number_taken(&self, bus_number: &str, except: BusId) -> bool {
        self.locations.values().any(|location| location.id != except && location.bus_number == bus_number)
    }

    /// Snapshot ordered by bus id.
    pub fn locations(&self) -> Vec<Location> {
        self.locations.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
