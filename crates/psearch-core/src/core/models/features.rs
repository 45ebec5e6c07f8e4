use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A labeled pharmacophore feature located in 3D space.
///
/// Labels are the short codes of the feature definitions in use (for the built-in set:
/// `A` acceptor, `D` donor, `P` positive, `N` negative, `H` hydrophobic, `a` aromatic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub label: String,
    pub position: Point3<f64>,
}

impl FeaturePoint {
    pub fn new(label: impl Into<String>, position: Point3<f64>) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

/// Serialized feature coordinates of one conformer: `(label, [x, y, z])` in perception order.
pub type FeatureCoords = Vec<(String, [f64; 3])>;
