use crate::cli::GenerateArgs;
use crate::config::{AppConfig, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use psearch::{
    core::io::{input::read_input, store::FileStore},
    core::pharmacophore::definitions::describe_label,
    core::toolkit::external::ExternalToolkit,
    engine::progress::ProgressReporter,
    workflows,
};
use std::fs;
use tracing::{debug, info};

pub fn run(args: GenerateArgs) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let app = build_config(&args)?;
    prepare_output_dir(&app)?;
    for (label, patterns) in app.generation.feature_definitions.iter() {
        debug!(
            "Feature '{}' ({}): {} pattern(s)",
            label,
            describe_label(label),
            patterns.len()
        );
    }

    info!("Loading input structures from {:?}", &app.input_path);
    let records = read_input(&app.input_path)?;
    println!(
        "Read {} record(s) from {}.",
        records.len(),
        app.input_path.display()
    );

    let mut store = FileStore::create(&app.db_path)?;
    let toolkit = ExternalToolkit::new(app.toolkit.program.clone(), app.toolkit.args.clone());
    info!("Chemistry toolkit helper: {:?}", toolkit.program());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting database generation...");
    info!("Invoking the core generation workflow...");
    let summary = workflows::generate::run(
        &toolkit,
        records,
        &mut store,
        &app.generation,
        Some(app.input_path.as_path()),
        &reporter,
    )?;

    println!(
        "✓ Database written to {}: {} molecule(s) stored, {} skipped.",
        app.db_path.display(),
        summary.written,
        summary.skipped
    );
    if summary.altered > 0 {
        println!(
            "Warning: {} molecule(s) were omitted and/or renamed compared with the original input file.",
            summary.altered
        );
    }
    if let Some(path) = &summary.manifest_path {
        println!(
            "The molecules corresponding to the generated database are stored in {}",
            path.display()
        );
    }
    Ok(())
}

fn prepare_output_dir(app: &AppConfig) -> Result<()> {
    if let Some(parent) = app.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
