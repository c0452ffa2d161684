use mep_core::{CommentStore, FeedbackStore, Settings};
use mep_llm::{GenerationBackend, OllamaClient, OllamaConfig, SupersedingSlot};
use std::sync::Arc;

use crate::{AuditRunner, ManualLibrary};

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub comments: Arc<CommentStore>,
    pub feedback: Arc<FeedbackStore>,
    pub llm: Arc<dyn GenerationBackend>,
    pub audit: Arc<AuditRunner>,
    pub manuals: Arc<ManualLibrary>,
    /// Latest composite search; a new one cancels the previous lookup
    pub search_slot: Arc<SupersedingSlot>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let llm = Arc::new(OllamaClient::new(OllamaConfig::from(&settings.llm)));
        Self::with_backend(settings, llm)
    }

    pub fn with_backend(settings: Settings, llm: Arc<dyn GenerationBackend>) -> Self {
        Self {
            comments: Arc::new(CommentStore::new(settings.comments_file())),
            feedback: Arc::new(FeedbackStore::new(settings.feedback_file())),
            audit: Arc::new(AuditRunner::new(&settings)),
            manuals: Arc::new(ManualLibrary::new(&settings)),
            search_slot: Arc::new(SupersedingSlot::new()),
            settings: Arc::new(settings),
            llm,
        }
    }
}
