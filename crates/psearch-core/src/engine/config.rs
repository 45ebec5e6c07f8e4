use crate::core::pharmacophore::definitions::FeatureDefinitions;
use crate::core::toolkit::Seed;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter '{name}' is out of range ({value}): {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Conformer pruning thresholds. `None` disables the corresponding filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PruningConfig {
    /// Energy window above the global minimum, in kcal/mol.
    pub energy_window: Option<f64>,
    /// Minimum RMS (Å) between any two kept conformers.
    pub rms_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub bin_step: f64,
    pub max_stereoisomers: usize,
    pub num_conformers: usize,
    pub pruning: PruningConfig,
    pub seed: Seed,
    pub feature_definitions: FeatureDefinitions,
    pub num_workers: usize,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    bin_step: Option<f64>,
    max_stereoisomers: Option<usize>,
    num_conformers: Option<usize>,
    energy_window: Option<f64>,
    rms_threshold: Option<f64>,
    seed: Option<Seed>,
    feature_definitions: Option<FeatureDefinitions>,
    num_workers: Option<usize>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bin_step(mut self, step: f64) -> Self {
        self.bin_step = Some(step);
        self
    }
    pub fn max_stereoisomers(mut self, n: usize) -> Self {
        self.max_stereoisomers = Some(n);
        self
    }
    pub fn num_conformers(mut self, n: usize) -> Self {
        self.num_conformers = Some(n);
        self
    }
    pub fn energy_window(mut self, window: Option<f64>) -> Self {
        self.energy_window = window;
        self
    }
    pub fn rms_threshold(mut self, threshold: Option<f64>) -> Self {
        self.rms_threshold = threshold;
        self
    }
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn feature_definitions(mut self, definitions: FeatureDefinitions) -> Self {
        self.feature_definitions = Some(definitions);
        self
    }
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = Some(n);
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let bin_step = self
            .bin_step
            .ok_or(ConfigError::MissingParameter("bin_step"))?;
        let max_stereoisomers = self
            .max_stereoisomers
            .ok_or(ConfigError::MissingParameter("max_stereoisomers"))?;
        let num_conformers = self
            .num_conformers
            .ok_or(ConfigError::MissingParameter("num_conformers"))?;

        non_negative("bin_step", bin_step)?;
        if max_stereoisomers == 0 {
            return Err(ConfigError::OutOfRange {
                name: "max_stereoisomers",
                value: 0.0,
                expected: "must be greater than 0",
            });
        }
        if num_conformers == 0 {
            return Err(ConfigError::OutOfRange {
                name: "num_conformers",
                value: 0.0,
                expected: "must be greater than 0",
            });
        }
        if let Some(window) = self.energy_window {
            non_negative("energy_window", window)?;
        }
        if let Some(threshold) = self.rms_threshold {
            non_negative("rms_threshold", threshold)?;
        }

        Ok(GenerationConfig {
            bin_step,
            max_stereoisomers,
            num_conformers,
            pruning: PruningConfig {
                energy_window: self.energy_window,
                rms_threshold: self.rms_threshold,
            },
            seed: self.seed.unwrap_or_default(),
            feature_definitions: self.feature_definitions.unwrap_or_default(),
            num_workers: self.num_workers.unwrap_or(1).max(1),
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            expected: "must be a finite, non-negative number",
        })
    }
}
