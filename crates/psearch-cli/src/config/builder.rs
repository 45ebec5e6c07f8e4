use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileGenerationConfig};
use super::models::{AppConfig, ToolkitCommand};
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use psearch::core::io::input::InputFormat;
use psearch::core::pharmacophore::definitions::FeatureDefinitions;
use psearch::core::toolkit::Seed;
use psearch::engine::config::GenerationConfigBuilder;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DATABASE_EXTENSION: &str = "dat";

pub fn build_config(args: &GenerateArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let gen_file = file_config.generation.take().unwrap_or_default();
    let bin_step = args
        .bin_step
        .or(gen_file.bin_step)
        .unwrap_or(defaults.bin_step);
    let nstereo = args.nstereo.or(gen_file.nstereo).unwrap_or(defaults.nstereo);
    let nconf = args.nconf.or(gen_file.nconf).unwrap_or(defaults.nconf);
    let energy_cutoff = args.energy_cutoff.or(gen_file.energy_cutoff);
    let rms = args.rms.or(gen_file.rms);
    let seed = args.seed.or(gen_file.seed).unwrap_or(defaults.seed);
    let ncpu = args.ncpu.or(gen_file.ncpu).unwrap_or(defaults.ncpu);
    if ncpu == 0 {
        return Err(CliError::Config(
            "The number of workers (--ncpu) must be at least 1.".to_string(),
        ));
    }

    let feature_definitions = match args.pharm_def.as_ref().or(gen_file.pharm_def.as_ref()) {
        Some(path) => {
            debug!("Loading feature definitions from {:?}", path);
            FeatureDefinitions::load(path)?
        }
        None => FeatureDefinitions::default(),
    };

    let generation = GenerationConfigBuilder::new()
        .bin_step(bin_step)
        .max_stereoisomers(nstereo)
        .num_conformers(nconf)
        .energy_window(energy_cutoff)
        .rms_threshold(rms)
        .seed(Seed::from_signed(seed))
        .feature_definitions(feature_definitions)
        .num_workers(ncpu)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    validate_input_path(&args.input)?;
    validate_database_path(&args.db)?;

    let toolkit_file = file_config.toolkit.take().unwrap_or_default();
    let toolkit = ToolkitCommand {
        program: args
            .toolkit
            .clone()
            .or(toolkit_file.program)
            .unwrap_or_else(|| PathBuf::from(&defaults.toolkit_program)),
        args: if args.toolkit_args.is_empty() {
            toolkit_file.args.unwrap_or_default()
        } else {
            args.toolkit_args.clone()
        },
    };

    Ok(AppConfig {
        input_path: args.input.clone(),
        db_path: args.db.clone(),
        toolkit,
        generation,
    })
}

fn validate_input_path(path: &Path) -> Result<()> {
    InputFormat::from_path(path)?;
    Ok(())
}

fn validate_database_path(path: &Path) -> Result<()> {
    let has_dat_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DATABASE_EXTENSION));
    if !has_dat_extension {
        return Err(CliError::Config(format!(
            "Wrong output file format for '{}'. The database file must have the .{} extension.",
            path.display(),
            DATABASE_EXTENSION
        )));
    }
    if path.exists() {
        return Err(CliError::Config(format!(
            "A database named '{}' already exists.",
            path.display()
        )));
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn generation_section(config: &mut FileConfig) -> &mut FileGenerationConfig {
    config.generation.get_or_insert_with(Default::default)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "generation.bin-step" => {
                let v = parse_value(key, value_str, "float")?;
                generation_section(&mut config).bin_step = Some(v);
            }
            "generation.nstereo" => {
                let v = parse_value(key, value_str, "integer")?;
                generation_section(&mut config).nstereo = Some(v);
            }
            "generation.nconf" => {
                let v = parse_value(key, value_str, "integer")?;
                generation_section(&mut config).nconf = Some(v);
            }
            "generation.energy-cutoff" => {
                let v = parse_value(key, value_str, "float")?;
                generation_section(&mut config).energy_cutoff = Some(v);
            }
            "generation.rms" => {
                let v = parse_value(key, value_str, "float")?;
                generation_section(&mut config).rms = Some(v);
            }
            "generation.seed" => {
                let v = parse_value(key, value_str, "integer")?;
                generation_section(&mut config).seed = Some(v);
            }
            "generation.ncpu" => {
                let v = parse_value(key, value_str, "integer")?;
                generation_section(&mut config).ncpu = Some(v);
            }
            "generation.pharm-def" => {
                generation_section(&mut config).pharm_def = Some(PathBuf::from(value_str));
            }
            "toolkit.program" => {
                config.toolkit.get_or_insert_with(Default::default).program =
                    Some(PathBuf::from(value_str));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
