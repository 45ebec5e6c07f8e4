use crate::core::io::input::InputRecord;
use crate::core::io::manifest::{ManifestError, manifest_path_for, write_manifest};
use crate::core::io::store::{
    RecordStore, StoreError, VariantFeatures, VariantFingerprints, VariantMolecules,
};
use crate::core::models::molecule::Molecule;
use crate::core::toolkit::ChemToolkit;
use crate::engine::config::GenerationConfig;
use crate::engine::conformers::generate_conformers;
use crate::engine::dedup::deduplicate;
use crate::engine::error::EngineError;
use crate::engine::features::extract_features;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::pruning::{PruneOutcome, prune_conformers};
use crate::engine::stereo::expand_stereoisomers;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// A progress notice is emitted every this many processed molecules.
const PROGRESS_INTERVAL: usize = 200;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input preparation failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Fatal toolkit failure while processing '{id}': {source}")]
    Toolkit {
        id: String,
        #[source]
        source: EngineError,
    },

    #[error("Worker panicked while processing '{id}': {message}")]
    WorkerPanicked { id: String, message: String },

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Failed to start the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything one molecule contributes to the record store, keyed by stereoisomer index.
///
/// Indices of stereoisomers that produced no data are absent, so the key set may be sparse.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeResult {
    pub id: String,
    pub molecules: VariantMolecules,
    pub pharmacophores: VariantFeatures,
    pub fingerprints: VariantFingerprints,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Molecules handed to the worker pool (input records minus dropped ones).
    pub submitted: usize,
    /// Molecules written to the store.
    pub written: usize,
    /// Molecules that produced no data.
    pub skipped: usize,
    /// Input records that were renamed or dropped.
    pub altered: usize,
    pub manifest_path: Option<PathBuf>,
}

/// Runs the complete pipeline for a single molecule.
///
/// Recoverable toolkit failures make the molecule produce no data (`Ok(None)`); any other
/// failure is returned and is fatal to the run.
#[instrument(skip_all, level = "debug", fields(id = %id))]
pub fn process_molecule(
    toolkit: &dyn ChemToolkit,
    molecule: &Molecule,
    id: &str,
    config: &GenerationConfig,
) -> Result<Option<MoleculeResult>, EngineError> {
    match generate_variants(toolkit, molecule, id, config) {
        Ok(Some(result)) => Ok(Some(result)),
        Ok(None) => {
            warn!("Molecule '{}' produced no conformers and will be skipped.", id);
            Ok(None)
        }
        Err(e) if e.is_recoverable() => {
            warn!("Molecule '{}' will be skipped: {}", id, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn generate_variants(
    toolkit: &dyn ChemToolkit,
    molecule: &Molecule,
    id: &str,
    config: &GenerationConfig,
) -> Result<Option<MoleculeResult>, EngineError> {
    let variants = expand_stereoisomers(toolkit, molecule, config.max_stereoisomers)?;

    let mut result = MoleculeResult {
        id: id.to_string(),
        molecules: VariantMolecules::new(),
        pharmacophores: VariantFeatures::new(),
        fingerprints: VariantFingerprints::new(),
    };

    for (index, variant) in variants.iter().enumerate() {
        let mut mol = generate_conformers(toolkit, variant, config.num_conformers, config.seed)?;
        if mol.num_conformers() == 0 {
            debug!("Stereoisomer {} of '{}' could not be embedded.", index, id);
            continue;
        }
        if let PruneOutcome::ForceFieldUnavailable =
            prune_conformers(toolkit, &mut mol, &config.pruning)?
        {
            continue;
        }
        let features = extract_features(
            toolkit,
            &mol,
            config.bin_step,
            &config.feature_definitions,
        )?;
        result.molecules.insert(index, mol);
        result.pharmacophores.insert(index, features.coords);
        result.fingerprints.insert(index, features.fingerprints);
    }

    if result.molecules.is_empty() {
        Ok(None)
    } else {
        Ok(Some(result))
    }
}

type WorkerOutcome = Result<Result<Option<MoleculeResult>, EngineError>, Box<dyn Any + Send>>;

/// Generates the database for `records`.
///
/// The input is deduplicated first; the surviving molecules are processed on a pool of
/// `min(available CPUs, max(num_workers, 1))` threads and their results written to `store`
/// by the calling thread, in completion order. When any record was renamed or dropped and
/// `input_path` is given, the corrected-input manifest is written next to it.
#[instrument(skip_all, name = "generation_workflow")]
pub fn run(
    toolkit: &dyn ChemToolkit,
    records: Vec<InputRecord>,
    store: &mut dyn RecordStore,
    config: &GenerationConfig,
    input_path: Option<&Path>,
    reporter: &ProgressReporter,
) -> Result<RunSummary, PipelineError> {
    // === Phase 1: Deduplication ===
    reporter.report(Progress::PhaseStart {
        name: "Deduplication",
    });
    let dedup = deduplicate(toolkit, records)?;
    info!(
        "Input holds {} record(s): {} to process, {} altered.",
        dedup.len(),
        dedup.kept().count(),
        dedup.altered_count()
    );
    reporter.report(Progress::PhaseFinish);

    store.write_bin_step(config.bin_step)?;

    // === Phase 2: Generation ===
    reporter.report(Progress::PhaseStart { name: "Generation" });
    let jobs: Vec<(Molecule, String)> = dedup
        .kept()
        .map(|(molecule, id)| (molecule.clone(), id.to_string()))
        .collect();
    let submitted = jobs.len();

    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let num_threads = available.min(config.num_workers.max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("psearch-worker-{}", i))
        .build()?;
    info!(
        "Processing {} molecule(s) on {} worker thread(s).",
        submitted, num_threads
    );

    reporter.report(Progress::MoleculesQueued {
        count: submitted as u64,
    });
    let abort = AtomicBool::new(false);
    let abort = &abort;
    let (tx, rx) = mpsc::channel::<(String, WorkerOutcome)>();

    let consumed = pool.in_place_scope(|scope| {
        for (molecule, id) in jobs {
            let tx = tx.clone();
            scope.spawn(move |_| {
                if abort.load(Ordering::Relaxed) {
                    return;
                }
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    process_molecule(toolkit, &molecule, &id, config)
                }));
                // The receiver is gone only after the run has already failed.
                let _ = tx.send((id, outcome));
            });
        }
        drop(tx);
        consume_results(rx, store, reporter, abort)
    });
    drop(pool);
    let written = consumed?;
    store.flush()?;
    reporter.report(Progress::MoleculesDrained);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Corrected-input manifest ===
    let altered = dedup.altered_count();
    let mut manifest_path = None;
    if altered > 0 {
        warn!(
            "{} molecule(s) were omitted and/or renamed compared with the original input.",
            altered
        );
        if let Some(input) = input_path {
            let path = manifest_path_for(input);
            write_manifest(&path, &dedup.manifest_rows())?;
            info!(
                "The molecules corresponding to the generated database are listed in {:?}.",
                path
            );
            manifest_path = Some(path);
        }
    }

    let summary = RunSummary {
        submitted,
        written,
        skipped: submitted - written,
        altered,
        manifest_path,
    };
    info!(
        "Database generation complete: {} written, {} skipped.",
        summary.written, summary.skipped
    );
    Ok(summary)
}

/// The single writer: drains worker results until every worker has finished or a fatal
/// error occurs. Returns the number of molecules written.
fn consume_results(
    rx: Receiver<(String, WorkerOutcome)>,
    store: &mut dyn RecordStore,
    reporter: &ProgressReporter,
    abort: &AtomicBool,
) -> Result<usize, PipelineError> {
    let mut processed = 0;
    let mut written = 0;

    for (id, outcome) in rx.iter() {
        processed += 1;
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(source)) => {
                abort.store(true, Ordering::Relaxed);
                return Err(PipelineError::Toolkit { id, source });
            }
            Err(payload) => {
                abort.store(true, Ordering::Relaxed);
                return Err(PipelineError::WorkerPanicked {
                    id,
                    message: panic_message(payload.as_ref()),
                });
            }
        };

        let has_data = result.is_some();
        if let Some(result) = result {
            if let Err(e) = write_result(store, &result) {
                abort.store(true, Ordering::Relaxed);
                return Err(e.into());
            }
            written += 1;
        }
        reporter.report(Progress::MoleculeFinished { written: has_data });

        if processed % PROGRESS_INTERVAL == 0 {
            let notice = format!("{} molecules were processed.", processed);
            info!("{}", notice);
            reporter.report(Progress::Message(notice));
        }
    }
    Ok(written)
}

fn write_result(store: &mut dyn RecordStore, result: &MoleculeResult) -> Result<(), StoreError> {
    store.write_mol(&result.id, &result.molecules)?;
    store.write_pharm(&result.id, &result.pharmacophores)?;
    store.write_fp(&result.id, &result.fingerprints)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
