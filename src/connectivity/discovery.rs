//! Adjacency discovery
//!
//! Two phases:
//! 1. candidate search and exact contact tests for every dirty item, read-only
//!    and run in parallel with Rayon
//! 2. a serial commit that replaces the dirty items' edges and clears the
//!    dirty flags
//!
//! Nothing is mutated before phase 2, so a cancelled pass leaves the graph
//! and the dirty set exactly as they were.

use super::error::{ConnectivityError, ConnectivityResult};
use super::registry::ItemRegistry;
use super::types::ItemId;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Touching pairs found by a discovery pass, normalised as `(low, high)`,
/// sorted and deduplicated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactSet {
    pub scanned: Vec<ItemId>,
    pub pairs: Vec<(ItemId, ItemId)>,
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.map(|flag| flag.load(Ordering::Relaxed)).unwrap_or(false)
}

/// Find every item touching `id`
///
/// When both items are dirty only the one with the lower id runs the exact
/// test; the other would find the same pair.
fn contacts_of(registry: &ItemRegistry, id: ItemId) -> Vec<(ItemId, ItemId)> {
    let item = match registry.get(id) {
        Some(item) => item,
        None => return vec![],
    };
    let epsilon = registry.settings().contact_epsilon;
    let mut found = Vec::new();

    registry.find_nearby(id, |candidate| {
        if candidate.is_dirty() && candidate.id() < id {
            return;
        }
        if item.touches(candidate, epsilon) {
            let other = candidate.id();
            found.push((id.min(other), id.max(other)));
        }
    });

    found
}

/// Phase 1: read-only contact search over the dirty items
pub fn discover_contacts(registry: &ItemRegistry, cancel: Option<&AtomicBool>) -> ConnectivityResult<ContactSet> {
    let start = std::time::Instant::now();
    let scanned = registry.dirty_items();

    let per_item: Vec<Vec<(ItemId, ItemId)>> = if registry.settings().parallel_discovery {
        scanned
            .par_iter()
            .map(|&id| if is_cancelled(cancel) { vec![] } else { contacts_of(registry, id) })
            .collect()
    } else {
        scanned
            .iter()
            .map(|&id| if is_cancelled(cancel) { vec![] } else { contacts_of(registry, id) })
            .collect()
    };

    if is_cancelled(cancel) {
        return Err(ConnectivityError::Cancelled(scanned.len()));
    }

    let mut pairs: Vec<(ItemId, ItemId)> = per_item.into_iter().flatten().collect();
    pairs.sort_unstable();
    pairs.dedup();

    debug!(
        "Discovery scanned {} dirty items, {} contacts in {:?}",
        scanned.len(),
        pairs.len(),
        start.elapsed()
    );

    Ok(ContactSet { scanned, pairs })
}

/// Phase 2: replace the scanned items' edges and mark everything clean
pub fn commit_contacts(registry: &mut ItemRegistry, contacts: &ContactSet) {
    for &id in &contacts.scanned {
        registry.disconnect_all(id);
    }
    for &(a, b) in &contacts.pairs {
        registry.connect(a, b);
    }
    registry.clear_dirty_flags();
}
