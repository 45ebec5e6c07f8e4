//! # psearch Core Library
//!
//! Generation of multi-conformer pharmacophore databases from 2D chemical structures. The
//! resulting record store holds, for every input molecule and each of its stereoisomers, the
//! pruned 3D conformer ensemble, the pharmacophore feature coordinates of every conformer and
//! the matching binary fingerprints used later for fast pharmacophore screening.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `Conformer`, feature
//!   points, fingerprints), geometry utilities, I/O (input reader, record store, corrected-input
//!   manifest) and the [`core::toolkit::ChemToolkit`] seam through which all chemistry
//!   (stereo enumeration, embedding, force fields, feature perception) is delegated.
//!
//! - **[`engine`]: The Logic Core.** The per-stage algorithms that sequence and filter toolkit
//!   results: deduplication of the input, stereoisomer expansion, conformer generation,
//!   energy/RMS conformer pruning and feature extraction, together with configuration,
//!   progress reporting and error types.
//!
//! - **[`workflows`]: The Public API.** The database generation workflow that fans molecules
//!   out over a worker pool and funnels the results into a single record-store writer.

pub mod core;
pub mod engine;
pub mod workflows;
