use std::{borrow::Borrow, collections::HashMap, hash::Hash};

use msgs::{Location, MarkerId};

use crate::marker::MarkerRecord;

/// Markers currently on the map, by id.
///
/// Map initialization inserts and removes entries. The receiver only reaches
/// existing entries through [`MarkerStore::get_mut`], so an event can never
/// add a marker.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: HashMap<MarkerId, MarkerRecord>,
}

impl MarkerStore {
    pub fn new() -> MarkerStore {
        MarkerStore::default()
    }

    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> MarkerStore {
        locations.into_iter().map(MarkerRecord::from).collect()
    }

    /// Returns the record previously stored under the same id.
    pub fn insert(&mut self, record: MarkerRecord) -> Option<MarkerRecord> {
        self.markers.insert(record.id.clone(), record)
    }

    pub fn remove<Q>(&mut self, id: &Q) -> Option<MarkerRecord>
    where
        MarkerId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.markers.remove(id)
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&MarkerRecord>
    where
        MarkerId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.markers.get(id)
    }

    pub(crate) fn get_mut<Q>(&mut self, id: &Q) -> Option<&mut MarkerRecord>
    where
        MarkerId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.markers.get_mut(id)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        MarkerId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.markers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.markers.values()
    }

    /// Ids in ascending order, numeric ids first and by value.
    pub fn sorted_ids(&self) -> Vec<&MarkerId> {
        let mut ids = self.markers.keys().collect::<Vec<_>>();
        ids.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        ids
    }
}

fn sort_key(id: &MarkerId) -> (bool, u64, &str) {
    match id.as_str().parse::<u64>() {
        Ok(n) => (false, n, id.as_str()),
        Err(_) => (true, 0, id.as_str()),
    }
}

impl FromIterator<MarkerRecord> for MarkerStore {
    fn from_iter<T: IntoIterator<Item = MarkerRecord>>(iter: T) -> Self {
        let mut store = MarkerStore::new();
        store.extend(iter);
        store
    }
}

impl Extend<MarkerRecord> for MarkerStore {
    fn extend<T: IntoIterator<Item = MarkerRecord>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}
