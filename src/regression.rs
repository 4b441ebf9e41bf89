//! Regression entry point.
//!
//! [`Regression`] owns one fit engine, one result cache and one model
//! selection, and ties them together: the requested model is resolved, the
//! cache is probed, and on a miss the engine fits the curve along the
//! fallback chain.

use std::sync::Arc;

use crate::cache::ResultCache;
use crate::error::Result;
use crate::fit::{FitConfig, FitEngine, FitResult};
use crate::metrics::RecruitmentMetrics;
use crate::model::FitModel;
use crate::selection::SelectionMode;

/// Fits and memoizes recruitment curves for one session.
#[derive(Debug, Default)]
pub struct Regression {
    engine: FitEngine,
    cache: ResultCache,
    selection: SelectionMode,
}

impl Regression {
    /// Create a regression with default configuration and the Boltzmann
    /// model selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a regression using `engine`.
    pub fn with_engine(engine: FitEngine) -> Self {
        Self {
            engine,
            cache: ResultCache::new(),
            selection: SelectionMode::default(),
        }
    }

    /// Create a regression whose engine uses `config`.
    pub fn with_config(config: FitConfig) -> Self {
        Self::with_engine(FitEngine::with_config(config))
    }

    /// Fits `(x, y)` and returns the curve as 100 evenly spaced samples over
    /// `[min(x), max(x)]`.
    ///
    /// `model_override` replaces the current model for the duration of the
    /// call only; the previous model is restored afterwards, whether the fit
    /// succeeds or not.
    pub fn run_regression(
        &self,
        x: &[i64],
        y: &[f64],
        model_override: Option<FitModel>,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        self.fit_result(x, y, model_override)
            .map(|result| result.curve())
    }

    /// Like [`Regression::run_regression`], returning the full fit result.
    pub fn fit_result(
        &self,
        x: &[i64],
        y: &[f64],
        model_override: Option<FitModel>,
    ) -> Result<Arc<FitResult>> {
        let _override = model_override.map(|model| self.selection.override_with(model));
        let model = model_override.unwrap_or_else(|| self.selection.current());

        self.cache
            .get_or_fit(x, y, model, || self.engine.fit(model, x, y))
    }

    /// Fits `(x, y)` and derives S50, slope, baseline and plateau.
    pub fn recruitment_metrics(
        &self,
        x: &[i64],
        y: &[f64],
        model_override: Option<FitModel>,
    ) -> Result<RecruitmentMetrics> {
        let result = self.fit_result(x, y, model_override)?;
        RecruitmentMetrics::from_result(&result)
    }

    /// Select the model used when no override is given.
    pub fn set_model(&self, model: FitModel) {
        self.selection.set(model);
    }

    /// The model used when no override is given.
    pub fn current_model(&self) -> FitModel {
        self.selection.current()
    }

    /// Get the fit engine.
    pub fn engine(&self) -> &FitEngine {
        &self.engine
    }

    /// Get the result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Get the model selection.
    pub fn selection(&self) -> &SelectionMode {
        &self.selection
    }
}
