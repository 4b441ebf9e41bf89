//! Ordered fallback between curve models.
//!
//! A [`FallbackChain`] is an explicit list of (model, solve function) steps.
//! Steps run in order until one succeeds; every recoverable failure is logged
//! and kept as a [`FailedAttempt`] so callers can see why the curve they got
//! is not the one they asked for.

use std::iter;

use tracing::{error, info, warn};

use crate::error::{FitError, Result};
use crate::model::FitModel;

/// A model that was tried and failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedAttempt {
    /// The model that failed.
    pub model: FitModel,
    /// Why it failed.
    pub error: FitError,
}

/// The successful step of a chain together with the failures before it.
#[derive(Debug, Clone)]
pub struct ChainOutcome<T> {
    /// Value produced by the successful step.
    pub value: T,
    /// Model of the successful step.
    pub model: FitModel,
    /// Failures that preceded it, in order.
    pub attempts: Vec<FailedAttempt>,
}

/// One step of a chain.
pub struct FallbackStep<'a, T> {
    model: FitModel,
    solve: Box<dyn Fn(FitModel) -> Result<T> + 'a>,
}

impl<'a, T> FallbackStep<'a, T> {
    /// Creates a step solving `model` with `solve`.
    pub fn new<F>(model: FitModel, solve: F) -> Self
    where
        F: Fn(FitModel) -> Result<T> + 'a,
    {
        Self {
            model,
            solve: Box::new(solve),
        }
    }

    /// The model this step fits.
    pub fn model(&self) -> FitModel {
        self.model
    }
}

/// The models tried for a request, starting with the requested one.
///
/// Follows [`FitModel::fallback`] until a model has no successor.
pub fn fallback_sequence(requested: FitModel) -> Vec<FitModel> {
    iter::successors(Some(requested), FitModel::fallback).collect()
}

/// An ordered list of fallback steps.
pub struct FallbackChain<'a, T> {
    requested: FitModel,
    steps: Vec<FallbackStep<'a, T>>,
}

impl<'a, T> FallbackChain<'a, T> {
    /// Creates an empty chain for a request of `requested`.
    pub fn new(requested: FitModel) -> Self {
        Self {
            requested,
            steps: Vec::new(),
        }
    }

    /// Builds the standard chain for `requested`, solving every step with
    /// `solve`.
    pub fn for_model<F>(requested: FitModel, solve: F) -> Self
    where
        F: Fn(FitModel) -> Result<T> + Clone + 'a,
    {
        fallback_sequence(requested)
            .into_iter()
            .fold(Self::new(requested), |chain, model| {
                chain.then(model, solve.clone())
            })
    }

    /// Appends a step.
    pub fn then<F>(mut self, model: FitModel, solve: F) -> Self
    where
        F: Fn(FitModel) -> Result<T> + 'a,
    {
        self.steps.push(FallbackStep::new(model, solve));
        self
    }

    /// Appends a prepared step.
    pub fn push(&mut self, step: FallbackStep<'a, T>) {
        self.steps.push(step);
    }

    /// The requested model.
    pub fn requested(&self) -> FitModel {
        self.requested
    }

    /// The models of the steps, in order.
    pub fn models(&self) -> Vec<FitModel> {
        self.steps.iter().map(FallbackStep::model).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the steps in order and returns the first success.
    ///
    /// # Errors
    ///
    /// * the error of a step directly when it is not recoverable
    ///   (see [`FitError::is_recoverable`])
    /// * `NoModelConverged` with every attempt when all steps fail
    pub fn run(&self) -> Result<ChainOutcome<T>> {
        let mut attempts = Vec::new();

        for step in &self.steps {
            info!(
                requested = %self.requested,
                model = %step.model,
                "fitting recruitment curve"
            );
            match (step.solve)(step.model) {
                Ok(value) => {
                    return Ok(ChainOutcome {
                        value,
                        model: step.model,
                        attempts,
                    })
                }
                Err(err) if !err.is_recoverable() => return Err(err),
                Err(err) => {
                    warn!(model = %step.model, error = %err, "fit failed, falling back");
                    attempts.push(FailedAttempt {
                        model: step.model,
                        error: err,
                    });
                }
            }
        }

        error!(
            requested = %self.requested,
            attempts = attempts.len(),
            "no model converged"
        );
        Err(FitError::NoModelConverged {
            requested: self.requested,
            attempts,
        })
    }
}
