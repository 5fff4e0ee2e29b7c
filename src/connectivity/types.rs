//! Connectivity data types and settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Net identifier as assigned by the schematic net list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetCode(pub u32);

impl NetCode {
    /// Reserved code for copper that belongs to no net
    pub const UNCONNECTED: NetCode = NetCode(0);

    pub fn is_connected(&self) -> bool {
        *self != NetCode::UNCONNECTED
    }
}

impl fmt::Display for NetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_connected() {
            write!(f, "net {}", self.0)
        } else {
            write!(f, "<no net>")
        }
    }
}

/// Handle of a connectivity item inside the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Handle of a cluster within the most recent build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ClusterId(pub u32);

/// Kind of board feature a connectivity item was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Pad,
    Track,
    Arc,
    Via,
    ZoneFragment,
}

impl ItemKind {
    /// Pads and zones carry a user or schematic assigned net; routing copper
    /// takes whatever net it is attached to
    pub fn default_can_change_net(&self) -> bool {
        matches!(self, ItemKind::Track | ItemKind::Arc | ItemKind::Via)
    }

    /// Kinds that connect through their whole copper area rather than only
    /// at their anchors
    pub fn connects_by_area(&self) -> bool {
        matches!(self, ItemKind::Pad | ItemKind::Via | ItemKind::ZoneFragment)
    }

    pub fn is_routing(&self) -> bool {
        matches!(self, ItemKind::Track | ItemKind::Arc)
    }
}

/// Tunables for connectivity building
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivitySettings {
    /// Gap (mm) up to which two copper shapes still count as touching
    pub contact_epsilon: f64,
    /// Maximum chord error (mm) when flattening arcs
    pub arc_tolerance: f64,
    /// Run candidate discovery on the rayon pool
    pub parallel_discovery: bool,
    /// Tracks, arcs or zones a via needs before it stops being dangling
    pub via_min_connections: usize,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            contact_epsilon: 1e-6,
            arc_tolerance: 0.005, // 5 µm
            parallel_discovery: true,
            via_min_connections: 1,
        }
    }
}

impl ConnectivitySettings {
    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read settings file {}: {}", path.as_ref().display(), e)
        })?;
        let settings: ConnectivitySettings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the geometry code cannot work with (NaN included)
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.contact_epsilon >= 0.0,
            "contact_epsilon must not be negative (got {})",
            self.contact_epsilon
        );
        anyhow::ensure!(
            self.arc_tolerance > 0.0,
            "arc_tolerance must be positive (got {})",
            self.arc_tolerance
        );
        Ok(())
    }
}
