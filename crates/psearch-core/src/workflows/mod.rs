//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **Database Generation** ([`generate`]) - Deduplicates the input, runs the per-molecule
//!   pipeline (stereo expansion, conformer generation, pruning, feature extraction) on a
//!   worker pool and streams the results into a [`RecordStore`](crate::core::io::store::RecordStore),
//!   writing the corrected-input manifest when records were renamed or dropped.

pub mod generate;
