//! Main contamination pipeline module.
//!
//! This module provides the core `Contaminator` struct and builder for
//! running the enabled operators over a table in a fixed order.

use crate::config::{ConfigValidationError, ContaminationConfig};
use crate::error::Result;
use crate::pipeline::ContaminationExecutor;
use crate::pipeline::progress::{
    ClosureProgressReporter, ContaminationStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{ContaminationResult, ContaminationSummary, OperatorKind};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The contamination pipeline.
///
/// Owns its random source, so two runs with the same seed, configuration
/// and input produce the same table. Running takes `&mut self`.
///
/// # Example
///
/// ```rust,ignore
/// use untidy::{Contaminator, ContaminationConfig};
///
/// let config = ContaminationConfig::builder()
///     .corruption_level(6)
///     .seed(42)
///     .build()?;
///
/// let result = Contaminator::builder()
///     .config(config)
///     .on_progress(|update| println!("{}", update.message))
///     .build()?
///     .contaminate(&df)?;
///
/// println!("{:?} -> {:?}", result.summary.shape_before, result.summary.shape_after);
/// ```
pub struct Contaminator {
    config: ContaminationConfig,
    rng: StdRng,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// A contaminator can be built on one thread and run on another
static_assertions::assert_impl_all!(Contaminator: Send);

impl Contaminator {
    /// Create a new contaminator builder.
    pub fn builder() -> ContaminatorBuilder {
        ContaminatorBuilder::default()
    }

    /// Create a contaminator from a configuration, without progress reporting.
    pub fn new(config: ContaminationConfig) -> std::result::Result<Self, ConfigValidationError> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ContaminationConfig {
        &self.config
    }

    /// Run every enabled operator over a copy of `df`.
    ///
    /// The input is never modified. The first operator failure aborts the
    /// run; no partially contaminated table is returned.
    pub fn contaminate(&mut self, df: &DataFrame) -> Result<ContaminationResult> {
        match self.contaminate_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Contamination complete"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Contamination error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Log at info when verbose, otherwise at debug.
    fn log_step(&self, message: &str) {
        if self.config.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn contaminate_internal(&mut self, df: &DataFrame) -> Result<ContaminationResult> {
        let start_time = Instant::now();
        let level = self.config.corruption_level;
        let options = self.config.operator_options();
        let enabled = self.config.operators.enabled();
        let total = enabled.len();

        self.log_step(&format!(
            "Contaminating {}x{} table at level {} with {} operators",
            df.height(),
            df.width(),
            level,
            total
        ));
        self.report_progress(ProgressUpdate::with_items(
            ContaminationStage::Initializing,
            0,
            total,
            "Starting contamination...",
        ));

        let mut summary = ContaminationSummary::new(level, df.shape());
        summary.skipped = OperatorKind::PIPELINE_ORDER
            .into_iter()
            .filter(|op| !self.config.operators.is_enabled(*op))
            .collect();

        let mut actions = Vec::with_capacity(total);
        let reporter = self.progress_reporter.clone();
        let verbose = self.config.verbose;

        let data = ContaminationExecutor::run(
            df,
            &enabled,
            level,
            &options,
            &mut self.rng,
            |step, action| {
                let message = format!(
                    "{}: {:?} -> {:?}",
                    action.operator.display_name(),
                    action.shape_before,
                    action.shape_after
                );
                if verbose {
                    info!("{}", message);
                }
                if let Some(reporter) = &reporter {
                    reporter.report(ProgressUpdate::with_items(
                        action.operator.into(),
                        step + 1,
                        total,
                        message,
                    ));
                }
                actions.push(action);
            },
        )?;

        for action in actions {
            summary.add_action(action);
        }
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        self.log_step(&format!(
            "Contamination finished in {} ms: {:?} -> {:?}",
            summary.duration_ms, summary.shape_before, summary.shape_after
        ));

        Ok(ContaminationResult { data, summary })
    }
}

/// Builder for creating a [`Contaminator`] instance.
///
/// Use [`Contaminator::builder()`] to get started.
#[derive(Default)]
pub struct ContaminatorBuilder {
    config: Option<ContaminationConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(ContaminatorBuilder: Send);

impl ContaminatorBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: ContaminationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during contamination.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the contaminator.
    ///
    /// Seeds the random source from `config.seed`, or from OS entropy when
    /// no seed is set. Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Contaminator, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Contaminator {
            config,
            rng,
            progress_reporter: self.progress_reporter,
        })
    }
}
