//! Configuration types for the contamination pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::contaminators::{MissingMarkerPolicy, OperatorOptions};
use crate::error::ContaminationError;
use crate::sampling::DEFAULT_MAX_CELL_PERCENT;
use crate::types::{CorruptionLevel, OperatorKind};
use serde::{Deserialize, Serialize};

/// Which operators the pipeline runs.
///
/// Every operator is enabled unless switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorFlags {
    pub missing_values: bool,
    pub outliers: bool,
    pub text_noise: bool,
    pub numeric_to_text: bool,
    pub encoding_change: bool,
    pub duplicate_rows: bool,
    pub duplicate_columns: bool,
}

impl Default for OperatorFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl OperatorFlags {
    /// Every operator enabled.
    pub fn all() -> Self {
        Self {
            missing_values: true,
            outliers: true,
            text_noise: true,
            numeric_to_text: true,
            encoding_change: true,
            duplicate_rows: true,
            duplicate_columns: true,
        }
    }

    /// Every operator disabled.
    pub fn none() -> Self {
        Self {
            missing_values: false,
            outliers: false,
            text_noise: false,
            numeric_to_text: false,
            encoding_change: false,
            duplicate_rows: false,
            duplicate_columns: false,
        }
    }

    /// Only the given operator enabled.
    pub fn only(operator: OperatorKind) -> Self {
        Self::none().with(operator, true)
    }

    pub fn is_enabled(&self, operator: OperatorKind) -> bool {
        match operator {
            OperatorKind::MissingValues => self.missing_values,
            OperatorKind::Outliers => self.outliers,
            OperatorKind::TextNoise => self.text_noise,
            OperatorKind::NumericToText => self.numeric_to_text,
            OperatorKind::EncodingChange => self.encoding_change,
            OperatorKind::DuplicateRows => self.duplicate_rows,
            OperatorKind::DuplicateColumns => self.duplicate_columns,
        }
    }

    pub fn set(&mut self, operator: OperatorKind, enabled: bool) {
        let flag = match operator {
            OperatorKind::MissingValues => &mut self.missing_values,
            OperatorKind::Outliers => &mut self.outliers,
            OperatorKind::TextNoise => &mut self.text_noise,
            OperatorKind::NumericToText => &mut self.numeric_to_text,
            OperatorKind::EncodingChange => &mut self.encoding_change,
            OperatorKind::DuplicateRows => &mut self.duplicate_rows,
            OperatorKind::DuplicateColumns => &mut self.duplicate_columns,
        };
        *flag = enabled;
    }

    pub fn with(mut self, operator: OperatorKind, enabled: bool) -> Self {
        self.set(operator, enabled);
        self
    }

    /// Enabled operators in pipeline order.
    pub fn enabled(&self) -> Vec<OperatorKind> {
        OperatorKind::PIPELINE_ORDER
            .into_iter()
            .filter(|op| self.is_enabled(*op))
            .collect()
    }
}

/// Configuration for the contamination pipeline.
///
/// Use [`ContaminationConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use untidy::config::{ContaminationConfig, OperatorFlags};
///
/// let config = ContaminationConfig::builder()
///     .corruption_level(6)
///     .seed(42)
///     .operators(OperatorFlags::all())
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContaminationConfig {
    /// How hard every operator hits the table, 0 to 10.
    /// Default: 4
    pub corruption_level: CorruptionLevel,

    /// Operators to run.
    /// Default: all enabled
    pub operators: OperatorFlags,

    /// Log every operator at info level instead of debug.
    /// Default: false
    pub verbose: bool,

    /// Seed for the random source. Runs with the same seed, input and
    /// configuration produce the same table.
    /// Default: None (seeded from entropy)
    pub seed: Option<u64>,

    /// Percentage of eligible cells the cell-level operators touch at
    /// level 10.
    /// Default: 60
    pub max_cell_percent: u8,

    /// Where the `"?"` marker may stand in for a null.
    /// Default: TextAndNumeric
    pub missing_marker_policy: MissingMarkerPolicy,
}

impl Default for ContaminationConfig {
    fn default() -> Self {
        Self {
            corruption_level: CorruptionLevel::default(),
            operators: OperatorFlags::default(),
            verbose: false,
            seed: None,
            max_cell_percent: DEFAULT_MAX_CELL_PERCENT,
            missing_marker_policy: MissingMarkerPolicy::default(),
        }
    }
}

impl ContaminationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ContaminationConfigBuilder {
        ContaminationConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_cell_percent > 100 {
            return Err(ConfigValidationError::InvalidCellPercent(
                self.max_cell_percent,
            ));
        }

        Ok(())
    }

    /// Options handed to the cell-level operators.
    pub fn operator_options(&self) -> OperatorOptions {
        OperatorOptions {
            max_cell_percent: self.max_cell_percent,
            missing_marker_policy: self.missing_marker_policy,
        }
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid corruption level: {0} (must be between 0 and 10)")]
    InvalidCorruptionLevel(u8),

    #[error("Invalid max cell percent: {0} (must be between 0 and 100)")]
    InvalidCellPercent(u8),
}

impl From<ConfigValidationError> for ContaminationError {
    fn from(err: ConfigValidationError) -> Self {
        ContaminationError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ContaminationConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ContaminationConfigBuilder {
    corruption_level: Option<u8>,
    operators: Option<OperatorFlags>,
    verbose: Option<bool>,
    seed: Option<u64>,
    max_cell_percent: Option<u8>,
    missing_marker_policy: Option<MissingMarkerPolicy>,
}

impl ContaminationConfigBuilder {
    /// Set the corruption level.
    ///
    /// # Arguments
    /// * `level` - Value between 0 (no change) and 10 (maximum change)
    pub fn corruption_level(mut self, level: u8) -> Self {
        self.corruption_level = Some(level);
        self
    }

    /// Set which operators run.
    pub fn operators(mut self, operators: OperatorFlags) -> Self {
        self.operators = Some(operators);
        self
    }

    /// Enable or disable a single operator, starting from all enabled.
    pub fn operator(mut self, operator: OperatorKind, enabled: bool) -> Self {
        let flags = self.operators.unwrap_or_default();
        self.operators = Some(flags.with(operator, enabled));
        self
    }

    /// Enable or disable per-operator info logging.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Fix the random seed for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the percentage of eligible cells touched at level 10.
    pub fn max_cell_percent(mut self, percent: u8) -> Self {
        self.max_cell_percent = Some(percent);
        self
    }

    /// Set where the `"?"` marker may replace a null.
    pub fn missing_marker_policy(mut self, policy: MissingMarkerPolicy) -> Self {
        self.missing_marker_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ContaminationConfig` or an error if validation fails.
    pub fn build(self) -> Result<ContaminationConfig, ConfigValidationError> {
        let corruption_level = match self.corruption_level {
            Some(level) => CorruptionLevel::new(level)
                .map_err(|_| ConfigValidationError::InvalidCorruptionLevel(level))?,
            None => CorruptionLevel::default(),
        };

        let config = ContaminationConfig {
            corruption_level,
            operators: self.operators.unwrap_or_default(),
            verbose: self.verbose.unwrap_or(false),
            seed: self.seed,
            max_cell_percent: self.max_cell_percent.unwrap_or(DEFAULT_MAX_CELL_PERCENT),
            missing_marker_policy: self.missing_marker_policy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
