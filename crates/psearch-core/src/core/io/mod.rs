//! File-level inputs and outputs.
//!
//! - [`input`] reads 2D structure collections (tab-separated SMILES or SDF).
//! - [`store`] is the conformer/pharmacophore database, written by a single owner.
//! - [`manifest`] writes the corrected copy of the input when records were renamed or dropped.

pub mod input;
pub mod manifest;
pub mod store;
