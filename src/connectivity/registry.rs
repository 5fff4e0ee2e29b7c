//! Item registry
//!
//! Owns every connectivity item of a board snapshot in an arena and keeps an
//! R-tree over their bounding boxes and layer spans. The index is
//! geometry-agnostic: `find_nearby` only reports candidates, the caller runs
//! the exact contact test.

use super::error::{ConnectivityError, ConnectivityResult};
use super::item::ConnectivityItem;
use super::types::{ConnectivitySettings, ItemId};
use crate::board::FeatureId;
use crate::geometry::{item_envelope, IndexedItem, LayerRange, Point};
use rstar::RTree;
use std::collections::HashMap;
use tracing::debug;

/// Arena slots are never reused between full builds: a freed slot stays
/// `None` until `clear`, which `ConnectivityEngine::build` calls.
pub struct ItemRegistry {
    slots: Vec<Option<ConnectivityItem>>,
    index: RTree<IndexedItem>,
    /// Envelope each indexed item was inserted with, needed for removal
    indexed: HashMap<ItemId, IndexedItem>,
    by_feature: HashMap<FeatureId, Vec<ItemId>>,
    dirty: bool,
    has_invalid: bool,
    settings: ConnectivitySettings,
}

impl ItemRegistry {
    pub fn new(settings: ConnectivitySettings) -> Self {
        Self {
            slots: Vec::new(),
            index: RTree::new(),
            indexed: HashMap::new(),
            by_feature: HashMap::new(),
            dirty: false,
            has_invalid: false,
            settings,
        }
    }

    pub fn settings(&self) -> &ConnectivitySettings {
        &self.settings
    }

    /// Drop every item and start over
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index = RTree::new();
        self.indexed.clear();
        self.by_feature.clear();
        self.dirty = false;
        self.has_invalid = false;
    }

    /// Take ownership of an item and index it
    pub fn add(&mut self, mut item: ConnectivityItem) -> ItemId {
        let id = ItemId(self.slots.len() as u32);
        item.assign_id(id);
        item.set_dirty(true);

        if item.is_valid() {
            self.insert_into_index(&mut item);
        } else {
            self.has_invalid = true;
        }

        self.by_feature.entry(item.feature()).or_default().push(id);
        self.slots.push(Some(item));
        self.dirty = true;
        id
    }

    fn insert_into_index(&mut self, item: &mut ConnectivityItem) {
        let entry = IndexedItem::new(item.id().0, &item.bounding_box(), item.layers());
        self.index.insert(entry.clone());
        self.indexed.insert(item.id(), entry);
    }

    fn remove_from_index(&mut self, id: ItemId) {
        if let Some(entry) = self.indexed.remove(&id) {
            self.index.remove(&entry);
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&ConnectivityItem> {
        self.slots.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    /// Geometry, layer and validity changes go through the registry methods
    /// so the index and flags stay in step.
    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut ConnectivityItem> {
        self.slots.get_mut(id.0 as usize).and_then(|slot| slot.as_mut())
    }

    /// Valid items in id order
    pub fn iter(&self) -> impl Iterator<Item = &ConnectivityItem> {
        self.slots.iter().flatten().filter(|item| item.is_valid())
    }

    /// Every owned item, including ones waiting to be purged
    pub fn iter_all(&self) -> impl Iterator<Item = &ConnectivityItem> {
        self.slots.iter().flatten()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConnectivityItem> {
        self.slots.iter_mut().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indexed_len(&self) -> usize {
        self.index.size()
    }

    pub fn items_for_feature(&self, feature: FeatureId) -> &[ItemId] {
        self.by_feature.get(&feature).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_feature(&self, feature: FeatureId) -> bool {
        !self.items_for_feature(feature).is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_invalid(&self) -> bool {
        self.has_invalid
    }

    /// Valid items awaiting adjacency discovery
    pub fn dirty_items(&self) -> Vec<ItemId> {
        self.iter().filter(|item| item.is_dirty()).map(|item| item.id()).collect()
    }

    /// Soft-delete an item; it stays in place until `purge_invalid`
    pub fn mark_invalid(&mut self, id: ItemId) {
        if let Some(item) = self.get_mut(id) {
            item.mark_invalid();
            self.has_invalid = true;
            self.dirty = true;
        }
    }

    /// Move an item and re-index it under its new bounding box
    pub fn translate_item(&mut self, id: ItemId, delta: Point) {
        self.reindex_with(id, |item| item.translate(delta));
    }

    /// Put an item on another layer span and re-index it
    pub fn set_layers(&mut self, id: ItemId, layers: LayerRange) {
        self.reindex_with(id, |item| item.set_layers(layers));
    }

    fn reindex_with<F>(&mut self, id: ItemId, edit: F)
    where
        F: FnOnce(&mut ConnectivityItem),
    {
        let mut item = match self.slots.get_mut(id.0 as usize).and_then(Option::take) {
            Some(item) => item,
            None => return,
        };
        self.remove_from_index(id);
        edit(&mut item);
        if item.is_valid() {
            self.insert_into_index(&mut item);
        }
        self.slots[id.0 as usize] = Some(item);
        self.dirty = true;
    }

    /// Visit every valid item whose envelope may touch `id`'s copper
    ///
    /// Candidates share at least one layer and have overlapping (or
    /// touching) bounding boxes. No exact geometry test is done here.
    pub fn find_nearby<F>(&self, id: ItemId, mut visitor: F)
    where
        F: FnMut(&ConnectivityItem),
    {
        let item = match self.get(id) {
            Some(item) if item.is_valid() => item,
            _ => return,
        };
        let bbox = match item.cached_bounding_box() {
            Some(bbox) => bbox.inflate(self.settings.contact_epsilon),
            None => return,
        };
        let envelope = item_envelope(&bbox, item.layers());

        for entry in self.index.locate_in_envelope_intersecting(&envelope) {
            if entry.id == id.0 {
                continue;
            }
            if let Some(candidate) = self.get(ItemId(entry.id)) {
                if candidate.is_valid() {
                    visitor(candidate);
                }
            }
        }
    }

    /// Add a symmetric edge between two items
    pub fn connect(&mut self, a: ItemId, b: ItemId) {
        if a == b {
            return;
        }
        if let Some((item_a, item_b)) = self.pair_mut(a, b) {
            item_a.connect(item_b);
        }
    }

    fn pair_mut(&mut self, a: ItemId, b: ItemId) -> Option<(&mut ConnectivityItem, &mut ConnectivityItem)> {
        let (ia, ib) = (a.0 as usize, b.0 as usize);
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            return None;
        }
        if ia < ib {
            let (left, right) = self.slots.split_at_mut(ib);
            Some((left[ia].as_mut()?, right[0].as_mut()?))
        } else {
            let (left, right) = self.slots.split_at_mut(ia);
            Some((right[0].as_mut()?, left[ib].as_mut()?))
        }
    }

    /// Remove all of an item's edges, from both sides
    pub fn disconnect_all(&mut self, id: ItemId) {
        let links = match self.get_mut(id) {
            Some(item) => item.take_links(),
            None => return,
        };
        for other in links {
            if let Some(neighbour) = self.get_mut(other) {
                neighbour.unlink(id);
            }
        }
    }

    /// Drop every invalid item from the arena, the index and its neighbours'
    /// adjacency lists. Never call this while a discovery pass is running.
    pub fn purge_invalid(&mut self) -> usize {
        if !self.has_invalid {
            return 0;
        }

        let invalid: Vec<ItemId> = self
            .iter_all()
            .filter(|item| !item.is_valid())
            .map(|item| item.id())
            .collect();

        for &id in &invalid {
            self.disconnect_all(id);
            self.remove_from_index(id);
            if let Some(item) = self.slots[id.0 as usize].take() {
                if let Some(ids) = self.by_feature.get_mut(&item.feature()) {
                    ids.retain(|other| *other != id);
                    if ids.is_empty() {
                        self.by_feature.remove(&item.feature());
                    }
                }
            }
        }

        self.has_invalid = false;
        debug!("Purged {} invalid items", invalid.len());
        invalid.len()
    }

    /// Commit a completed rescan: every item is clean again
    pub fn clear_dirty_flags(&mut self) {
        for item in self.iter_mut() {
            item.set_dirty(false);
        }
        self.dirty = false;
    }

    /// Check the internal invariants
    ///
    /// - adjacency is symmetric, sorted and duplicate-free
    /// - adjacency never references a missing item
    /// - every index entry belongs to an owned item and every valid item is indexed
    /// - index entries carry the item's current layer span
    /// - soft-deleted items are flagged for the next purge
    pub fn verify(&self) -> ConnectivityResult<()> {
        for item in self.iter_all() {
            let links = item.connected();
            if links.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConnectivityError::InvariantViolation(format!(
                    "adjacency of item {:?} is not strictly sorted",
                    item.id()
                )));
            }
            for other in links {
                match self.get(*other) {
                    Some(neighbour) if neighbour.is_connected_to(item.id()) => {}
                    Some(_) => {
                        return Err(ConnectivityError::InvariantViolation(format!(
                            "edge {:?} -> {:?} has no reverse edge",
                            item.id(),
                            other
                        )))
                    }
                    None => {
                        return Err(ConnectivityError::InvariantViolation(format!(
                            "item {:?} is adjacent to freed item {:?}",
                            item.id(),
                            other
                        )))
                    }
                }
            }
            if !item.is_valid() && !self.has_invalid {
                return Err(ConnectivityError::InvariantViolation(format!(
                    "invalid item {:?} is not scheduled for purging",
                    item.id()
                )));
            }
            if item.is_valid() {
                let entry = match self.indexed.get(&item.id()) {
                    Some(entry) => entry,
                    None => {
                        return Err(ConnectivityError::InvariantViolation(format!(
                            "valid item {:?} is missing from the spatial index",
                            item.id()
                        )))
                    }
                };
                let layers = item.layers();
                if entry.envelope.lower()[2] != layers.top as f64 || entry.envelope.upper()[2] != layers.bottom as f64 {
                    return Err(ConnectivityError::InvariantViolation(format!(
                        "index entry of item {:?} has a stale layer span",
                        item.id()
                    )));
                }
            }
        }

        for entry in self.index.iter() {
            if self.get(ItemId(entry.id)).is_none() {
                return Err(ConnectivityError::InvariantViolation(format!(
                    "index entry {} references a freed item",
                    entry.id
                )));
            }
        }
        if self.index.size() != self.indexed.len() {
            return Err(ConnectivityError::InvariantViolation(format!(
                "index holds {} entries but {} are tracked",
                self.index.size(),
                self.indexed.len()
            )));
        }

        Ok(())
    }
}
