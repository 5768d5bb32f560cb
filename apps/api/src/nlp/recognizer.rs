use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::nlp::entity::Entity;
use crate::nlp::pattern_model::PatternModel;

/// A loaded entity recognition model. Implementations are immutable after
/// construction and shared across requests behind an `Arc`.
pub trait EntityRecognizer: Send + Sync {
    /// Human-readable model identifier, e.g. `resume_skills@1.2.0`.
    fn name(&self) -> &str;

    /// Every label the model can emit.
    fn labels(&self) -> &[String];

    /// Runs inference. Entities come back ordered by start offset.
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

/// Outcome of the one-time model load at startup.
///
/// There is no retry: an `Unavailable` handle stays unavailable until the
/// process restarts.
#[derive(Clone)]
pub enum ModelHandle {
    Loaded(Arc<dyn EntityRecognizer>),
    Unavailable { reason: String },
}

impl ModelHandle {
    /// Loads the model artifact at `path`, logging the outcome.
    pub fn load(path: &Path) -> Self {
        match PatternModel::load(path) {
            Ok(model) => {
                info!(
                    "Entity model loaded: {} ({} patterns, {} labels) from {}",
                    model.name(),
                    model.pattern_count(),
                    model.labels().len(),
                    path.display()
                );
                ModelHandle::Loaded(Arc::new(model))
            }
            Err(e) => {
                error!("Entity model unavailable at {}: {e}", path.display());
                ModelHandle::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn recognizer(&self) -> Option<&Arc<dyn EntityRecognizer>> {
        match self {
            ModelHandle::Loaded(model) => Some(model),
            ModelHandle::Unavailable { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.recognizer().is_some()
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelHandle::Loaded(model) => f.debug_tuple("Loaded").field(&model.name()).finish(),
            ModelHandle::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
