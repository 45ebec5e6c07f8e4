//! # Core Module
//!
//! Fundamental building blocks shared by the engine and the workflows.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Molecules, conformers and their coordinates
//! - **Pharmacophores** ([`pharmacophore`]) - Feature definitions, pharmacophore models and fingerprints
//! - **Chemistry Toolkit** ([`toolkit`]) - The interface to the external cheminformatics toolkit
//! - **File I/O** ([`io`]) - Input reading, the record store and the corrected-input manifest
//! - **Utilities** ([`utils`]) - Geometry helpers such as superposition and RMSD

pub mod io;
pub mod models;
pub mod pharmacophore;
pub mod toolkit;
pub mod utils;
