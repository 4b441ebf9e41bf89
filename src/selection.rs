//! The session's current curve model.

use std::sync::{PoisonError, RwLock};

use crate::model::FitModel;

/// Holds the model used when a request does not name one.
///
/// Defaults to [`FitModel::Boltzmann`].
#[derive(Debug, Default)]
pub struct SelectionMode {
    current: RwLock<FitModel>,
}

impl SelectionMode {
    /// Creates a selection starting at `model`.
    pub fn new(model: FitModel) -> Self {
        Self {
            current: RwLock::new(model),
        }
    }

    /// The current model.
    pub fn current(&self) -> FitModel {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the current model and returns the previous one.
    pub fn set(&self, model: FitModel) -> FitModel {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, model)
    }

    /// Makes `model` current until the returned guard is dropped.
    ///
    /// Overlapping overrides restore in drop order.
    pub fn override_with(&self, model: FitModel) -> ModelOverride<'_> {
        let previous = self.set(model);
        ModelOverride {
            selection: self,
            model,
            previous,
        }
    }
}

/// Restores the previous model of a [`SelectionMode`] when dropped.
#[must_use = "the override ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ModelOverride<'a> {
    selection: &'a SelectionMode,
    model: FitModel,
    previous: FitModel,
}

impl ModelOverride<'_> {
    /// The model in effect while the guard lives.
    pub fn model(&self) -> FitModel {
        self.model
    }

    /// The model restored on drop.
    pub fn previous(&self) -> FitModel {
        self.previous
    }
}

impl Drop for ModelOverride<'_> {
    fn drop(&mut self) {
        self.selection.set(self.previous);
    }
}
