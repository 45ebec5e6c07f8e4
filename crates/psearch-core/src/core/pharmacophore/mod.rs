//! Pharmacophore models derived from conformer feature points.
//!
//! - [`definitions`] - Feature label → SMARTS pattern sets (built-in defaults or TOML files)
//! - [`model`] - The per-conformer [`model::Pharmacophore`] and its feature coordinates
//! - [`fingerprint`] - Fixed-width fingerprints of binned three-feature signatures

pub mod definitions;
pub mod fingerprint;
pub mod model;
