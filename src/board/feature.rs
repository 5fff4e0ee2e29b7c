//! Board features: the copper objects the host application owns

use crate::connectivity::NetCode;
use crate::geometry::{LayerRange, Point, Shape};
use serde::{Deserialize, Serialize};

/// Stable identifier of a board feature
pub type FeatureId = u64;

/// One filled polygon of a zone on a single copper layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneFill {
    pub layer: u8,
    pub outline: Vec<Point>,
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

/// Geometry and layer placement of a board feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Pad {
        position: Point,
        shape: Shape,
        layers: LayerRange,
    },
    Track {
        start: Point,
        end: Point,
        width: f64,
        layer: u8,
    },
    Arc {
        start: Point,
        mid: Point,
        end: Point,
        width: f64,
        layer: u8,
    },
    Via {
        position: Point,
        diameter: f64,
        layers: LayerRange,
    },
    /// Filled zone; the fill polygons come from the zone filler
    Zone {
        fills: Vec<ZoneFill>,
    },
}

/// A copper feature on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    #[serde(default)]
    pub net: NetCode,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl Feature {
    pub fn pad(id: FeatureId, net: NetCode, position: Point, shape: Shape, layers: LayerRange) -> Self {
        Self {
            id,
            net,
            kind: FeatureKind::Pad { position, shape, layers },
        }
    }

    pub fn track(id: FeatureId, net: NetCode, start: Point, end: Point, width: f64, layer: u8) -> Self {
        Self {
            id,
            net,
            kind: FeatureKind::Track { start, end, width, layer },
        }
    }

    pub fn arc(id: FeatureId, net: NetCode, start: Point, mid: Point, end: Point, width: f64, layer: u8) -> Self {
        Self {
            id,
            net,
            kind: FeatureKind::Arc { start, mid, end, width, layer },
        }
    }

    pub fn via(id: FeatureId, net: NetCode, position: Point, diameter: f64, layers: LayerRange) -> Self {
        Self {
            id,
            net,
            kind: FeatureKind::Via { position, diameter, layers },
        }
    }

    pub fn zone(id: FeatureId, net: NetCode, fills: Vec<ZoneFill>) -> Self {
        Self {
            id,
            net,
            kind: FeatureKind::Zone { fills },
        }
    }

    pub fn net(&self) -> NetCode {
        self.net
    }

    pub fn set_net(&mut self, net: NetCode) {
        self.net = net;
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            FeatureKind::Pad { .. } => "pad",
            FeatureKind::Track { .. } => "track",
            FeatureKind::Arc { .. } => "arc",
            FeatureKind::Via { .. } => "via",
            FeatureKind::Zone { .. } => "zone",
        }
    }

    /// Move the feature by `delta`
    pub fn translate(&mut self, delta: Point) {
        match &mut self.kind {
            FeatureKind::Pad { position, shape, .. } => {
                *position = *position + delta;
                shape.translate(delta);
            }
            FeatureKind::Track { start, end, .. } => {
                *start = *start + delta;
                *end = *end + delta;
            }
            FeatureKind::Arc { start, mid, end, .. } => {
                *start = *start + delta;
                *mid = *mid + delta;
                *end = *end + delta;
            }
            FeatureKind::Via { position, .. } => {
                *position = *position + delta;
            }
            FeatureKind::Zone { fills } => {
                for p in fills
                    .iter_mut()
                    .flat_map(|f| f.outline.iter_mut().chain(f.holes.iter_mut().flatten()))
                {
                    *p = *p + delta;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_json_shape() {
        let json = r#"{
            "id": 7,
            "net": 3,
            "kind": "pad",
            "position": {"x": 1.0, "y": 2.0},
            "shape": {"type": "rect", "center": {"x": 1.0, "y": 2.0}, "width": 1.0, "height": 0.5},
            "layers": {"top": 0, "bottom": 0}
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.id, 7);
        assert_eq!(feature.net(), NetCode(3));
        assert_eq!(feature.kind_name(), "pad");
    }

    #[test]
    fn test_translate_track() {
        let mut t = Feature::track(1, NetCode::UNCONNECTED, Point::new(0.0, 0.0), Point::new(1.0, 0.0), 0.2, 0);
        t.translate(Point::new(1.0, 1.0));
        match t.kind {
            FeatureKind::Track { start, end, .. } => {
                assert_eq!(start, Point::new(1.0, 1.0));
                assert_eq!(end, Point::new(2.0, 1.0));
            }
            _ => unreachable!(),
        }
    }
}
