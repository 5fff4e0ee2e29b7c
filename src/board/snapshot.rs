//! Board snapshot: the set of features handed to the engine

use super::feature::{Feature, FeatureId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

/// Default copper layer count when a snapshot does not say
pub const DEFAULT_COPPER_LAYERS: u8 = 2;

/// All copper features of a board, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub copper_layer_count: u8,
    pub features: IndexMap<FeatureId, Feature>,
}

/// On-disk JSON layout of a board snapshot
#[derive(Debug, Serialize, Deserialize)]
struct BoardFile {
    #[serde(default = "default_layer_count")]
    copper_layer_count: u8,
    features: Vec<Feature>,
}

fn default_layer_count() -> u8 {
    DEFAULT_COPPER_LAYERS
}

impl Board {
    pub fn new(copper_layer_count: u8) -> Self {
        Self {
            copper_layer_count,
            features: IndexMap::new(),
        }
    }

    /// Parse a board snapshot from a JSON file
    ///
    /// # Example
    /// ```ignore
    /// let board = Board::from_json_file("boards/demo.json")?;
    /// println!("{} features", board.features.len());
    /// ```
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Board> {
        let file = File::open(&path)
            .map_err(|e| anyhow::anyhow!("Failed to open board file {}: {}", path.as_ref().display(), e))?;
        let file: BoardFile = serde_json::from_reader(BufReader::new(file))?;
        Self::from_features(file.copper_layer_count, file.features)
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Board> {
        let file: BoardFile = serde_json::from_str(text)?;
        Self::from_features(file.copper_layer_count, file.features)
    }

    /// Board sent inline, as in a `LoadBoard` request
    pub fn from_json_value(value: serde_json::Value) -> anyhow::Result<Board> {
        let file: BoardFile = serde_json::from_value(value)?;
        Self::from_features(file.copper_layer_count, file.features)
    }

    /// Build a board, rejecting duplicate feature ids
    pub fn from_features(copper_layer_count: u8, features: Vec<Feature>) -> anyhow::Result<Board> {
        anyhow::ensure!(copper_layer_count > 0, "Board must have at least one copper layer");
        let mut board = Board::new(copper_layer_count);
        for feature in features {
            let id = feature.id;
            anyhow::ensure!(
                board.features.insert(id, feature).is_none(),
                "Duplicate feature id {} in board snapshot",
                id
            );
        }
        Ok(board)
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        let file = BoardFile {
            copper_layer_count: self.copper_layer_count,
            features: self.features.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Insert or replace a feature; returns the previous version
    pub fn insert(&mut self, feature: Feature) -> Option<Feature> {
        self.features.insert(feature.id, feature)
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&id)
    }

    /// Remove a feature, keeping the order of the rest
    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        self.features.shift_remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }
}
