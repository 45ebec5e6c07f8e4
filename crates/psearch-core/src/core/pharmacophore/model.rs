use super::fingerprint::Fingerprint;
use crate::core::models::features::{FeatureCoords, FeaturePoint};

const VERTEX_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Resolution used for distances when binning is disabled (`bin_step == 0`), in Angstroms.
const UNBINNED_RESOLUTION: f64 = 0.01;

/// The pharmacophore of a single conformer: its feature points and the spatial binning
/// step at which inter-feature distances are discretized.
#[derive(Debug, Clone, PartialEq)]
pub struct Pharmacophore {
    bin_step: f64,
    features: Vec<FeaturePoint>,
}

impl Pharmacophore {
    pub fn new(features: Vec<FeaturePoint>, bin_step: f64) -> Self {
        Self { bin_step, features }
    }

    pub fn bin_step(&self) -> f64 {
        self.bin_step
    }

    pub fn features(&self) -> &[FeaturePoint] {
        &self.features
    }

    pub fn feature_coords(&self) -> FeatureCoords {
        self.features
            .iter()
            .map(|f| {
                (
                    f.label.clone(),
                    [f.position.x, f.position.y, f.position.z],
                )
            })
            .collect()
    }

    /// Encodes every three-feature subset as a canonical triangle signature and folds the
    /// signatures into a [`Fingerprint`].
    ///
    /// A signature consists of the three labels and the three binned edge lengths, taken in
    /// the vertex order that yields the lexicographically smallest tuple, so the encoding does
    /// not depend on the perception order of the features.
    pub fn fingerprint(&self) -> Fingerprint {
        let n = self.features.len();
        let mut bits = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let signature = self.triangle_signature([i, j, k]);
                    bits.push(Fingerprint::bit_for_signature(&signature));
                }
            }
        }
        Fingerprint::from_bits(bits)
    }

    fn binned_distance(&self, a: usize, b: usize) -> i64 {
        let d = (self.features[a].position - self.features[b].position).norm();
        let step = if self.bin_step > 0.0 {
            self.bin_step
        } else {
            UNBINNED_RESOLUTION
        };
        (d / step).round() as i64
    }

    fn triangle_signature(&self, vertices: [usize; 3]) -> String {
        VERTEX_ORDERS
            .iter()
            .map(|order| {
                let [v0, v1, v2] = order.map(|o| vertices[o]);
                (
                    self.features[v0].label.as_str(),
                    self.features[v1].label.as_str(),
                    self.features[v2].label.as_str(),
                    self.binned_distance(v0, v1),
                    self.binned_distance(v0, v2),
                    self.binned_distance(v1, v2),
                )
            })
            .min()
            .map(|(l0, l1, l2, d01, d02, d12)| format!("{l0}|{l1}|{l2}|{d01}|{d02}|{d12}"))
            .unwrap_or_default()
    }
}
