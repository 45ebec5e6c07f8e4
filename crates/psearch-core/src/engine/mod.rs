//! # Engine Module
//!
//! The per-molecule generation pipeline, stage by stage. Every stage is a plain function
//! over owned data plus a shared [`ChemToolkit`](crate::core::toolkit::ChemToolkit), so a unit
//! of work can run on any worker thread without touching shared mutable state.
//!
//! ## Stages
//!
//! - **Deduplication** ([`dedup`]) - Drops structural duplicates and renames colliding identifiers
//! - **Stereo Expansion** ([`stereo`]) - Bounded enumeration of stereoisomers
//! - **Conformer Generation** ([`conformers`]) - Hydrogens, embedding and minimization
//! - **Conformer Pruning** ([`pruning`]) - Energy window and greedy RMS redundancy filter
//! - **Feature Extraction** ([`features`]) - Feature coordinates and fingerprints per conformer
//!
//! Supporting modules hold the [`config`], the [`error`] types and [`progress`] reporting.

pub mod config;
pub mod conformers;
pub mod dedup;
pub mod error;
pub mod features;
pub mod progress;
pub mod pruning;
pub mod stereo;
