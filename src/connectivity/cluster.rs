//! Clusters: connected components of the touch graph
//!
//! Traversal treats the registry as read-only. Visited state lives in a set
//! owned by the traversal, never on the items, so the same graph can be
//! walked again by another pass without resetting anything.

use super::registry::ItemRegistry;
use super::types::{ClusterId, ItemId, NetCode};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// One electrical node found in the copper
#[derive(Clone, Debug)]
pub struct Cluster {
    id: ClusterId,
    /// Members in traversal order
    items: Vec<ItemId>,
    origin_net: Option<NetCode>,
    conflicting: bool,
    /// Votes per authoritative net
    net_ranks: BTreeMap<NetCode, usize>,
}

impl Cluster {
    pub fn new(id: ClusterId) -> Self {
        Self {
            id,
            items: Vec::new(),
            origin_net: None,
            conflicting: false,
            net_ranks: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    pub(crate) fn push(&mut self, id: ItemId) {
        self.items.push(id);
    }

    /// Net the cluster represents, `None` for orphaned copper or a conflict
    pub fn origin_net(&self) -> Option<NetCode> {
        if self.conflicting {
            None
        } else {
            self.origin_net
        }
    }

    pub fn is_conflicting(&self) -> bool {
        self.conflicting
    }

    /// No authoritative net reached this copper
    pub fn is_orphaned(&self) -> bool {
        !self.conflicting && self.origin_net.is_none()
    }

    /// Sticky for the rest of the build
    pub(crate) fn mark_conflicting(&mut self) {
        self.conflicting = true;
        self.origin_net = None;
    }

    pub(crate) fn set_origin_net(&mut self, net: NetCode) {
        if !self.conflicting {
            self.origin_net = Some(net);
        }
    }

    pub(crate) fn add_vote(&mut self, net: NetCode) {
        *self.net_ranks.entry(net).or_insert(0) += 1;
    }

    /// Candidate nets by vote count, highest first; ties go to the lower net code
    pub fn ranked_nets(&self) -> Vec<(NetCode, usize)> {
        let mut ranks: Vec<(NetCode, usize)> = self.net_ranks.iter().map(|(n, c)| (*n, *c)).collect();
        ranks.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranks
    }

    pub fn distinct_nets(&self) -> usize {
        self.net_ranks.len()
    }
}

/// Partition all valid items into clusters by breadth-first traversal
///
/// Linear in items plus edges. Clusters come out in order of their lowest
/// item id, so the partition is stable across runs.
pub fn find_clusters(registry: &ItemRegistry) -> Vec<Cluster> {
    let mut visited: HashSet<ItemId> = HashSet::with_capacity(registry.len());
    let mut clusters = Vec::new();
    let mut queue: VecDeque<ItemId> = VecDeque::new();

    for seed in registry.iter() {
        if !visited.insert(seed.id()) {
            continue;
        }

        let mut cluster = Cluster::new(ClusterId(clusters.len() as u32));
        queue.push_back(seed.id());

        while let Some(current) = queue.pop_front() {
            cluster.push(current);
            let item = match registry.get(current) {
                Some(item) => item,
                None => continue,
            };
            for &next in item.connected() {
                let valid = registry.get(next).map(|n| n.is_valid()).unwrap_or(false);
                if valid && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}

/// Cluster of every item, for reverse lookup
pub fn cluster_membership(clusters: &[Cluster]) -> std::collections::HashMap<ItemId, ClusterId> {
    clusters
        .iter()
        .flat_map(|c| c.items().iter().map(move |id| (*id, c.id())))
        .collect()
}
