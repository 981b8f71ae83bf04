//! Holder of the active rule model.
//!
//! Replacement is copy-on-replace: evaluations keep the `Arc` they took with
//! [`ModelStore::snapshot`], so swapping the model never affects work that is
//! already running.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use super::{load_document, ConfigError, ConfigFormat, RuleDocument, RuleModel};
use crate::config::Settings;

/// Shared slot for the currently active [`RuleModel`].
#[derive(Debug, Default)]
pub struct ModelStore {
    active: RwLock<Arc<RuleModel>>,
}

impl ModelStore {
    /// Creates a store holding `model`.
    #[must_use]
    pub fn new(model: RuleModel) -> Self {
        Self {
            active: RwLock::new(Arc::new(model)),
        }
    }

    /// Returns the active model.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RuleModel> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the active model wholesale.
    pub fn replace(&self, model: RuleModel) {
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(model);
    }

    /// Loads a document and activates its model.
    ///
    /// On failure the previous model stays active.
    ///
    /// # Errors
    ///
    /// Returns the load error unchanged.
    pub fn reload(&self, bytes: &[u8], format: ConfigFormat) -> Result<Settings, ConfigError> {
        match load_document(bytes, format) {
            Ok(RuleDocument { model, settings }) => {
                info!("Activated rule model with {} rules", model.len());
                self.replace(model);
                Ok(settings)
            }
            Err(e) => {
                warn!("Rule reload rejected, keeping previous model: {e}");
                Err(e)
            }
        }
    }
}
