//! Board feature layer
//!
//! The host-side model of copper features (pads, tracks, arcs, vias and
//! filled zones). The connectivity engine only reads geometry from here and
//! writes propagated net codes back.
//!
//! # Submodules
//! - `feature` - Feature and FeatureKind definitions
//! - `snapshot` - Board container and JSON snapshot loading

mod feature;
mod snapshot;

pub use feature::{Feature, FeatureId, FeatureKind, ZoneFill};
pub use snapshot::{Board, DEFAULT_COPPER_LAYERS};
