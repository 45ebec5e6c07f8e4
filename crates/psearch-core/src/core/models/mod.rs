//! # Core Models Module
//!
//! Data structures describing molecules as they flow through the generation pipeline.
//!
//! - [`molecule`] - A chemical structure in toolkit-native text form plus its 3D conformers
//! - [`features`] - Labeled pharmacophore feature points and their serialized coordinates
//!
//! ```ignore
//! use psearch::core::models::molecule::Molecule;
//!
//! let mol = Molecule::from_smiles("CC(=O)Oc1ccccc1C(=O)O");
//! assert_eq!(mol.num_conformers(), 0);
//! ```

pub mod features;
pub mod molecule;
