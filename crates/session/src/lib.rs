/// Session state for the generation studio
///
/// Pure value types: uploaded images and their designations, the composed
/// prompt, the in-memory history of generated videos, and the coarse
/// application mode that gates the submission entry points. No I/O here;
/// the orchestrator replaces the whole `Session` value on each transition.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod assets;
pub use assets::*;
mod prompt;
pub use prompt::*;

/// Coarse process-wide mode. Exactly one holds at a time; enhance/generate
/// entry points are callable only in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationMode {
    NeedsCredential,
    Idle,
    EnhancingPrompt,
    GeneratingVideo,
}

/// A completed generation, kept for the current session only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedVideo {
    /// Fetched binary content.
    pub media: Vec<u8>,
    /// The prompt text that produced it.
    pub source_prompt: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedVideo {
    pub fn new(media: Vec<u8>, source_prompt: impl Into<String>) -> Self {
        Self {
            media,
            source_prompt: source_prompt.into(),
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub mode: ApplicationMode,
    pub prompt: PromptState,
    pub images: DesignationStore,
    /// Insertion order is chronological.
    pub history: Vec<GeneratedVideo>,
    /// Still image awaiting an explicit transfer into `images`.
    pub pending_image: Option<ImageAsset>,
    /// Busy flag for the still-image flow; independent of `mode` so it does
    /// not serialize with video generation.
    pub image_busy: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: ApplicationMode::NeedsCredential,
            prompt: PromptState::new(),
            images: DesignationStore::new(),
            history: Vec::new(),
            pending_image: None,
            image_busy: false,
        }
    }

    /// History in display order (most recent first).
    pub fn latest_first(&self) -> impl Iterator<Item = &GeneratedVideo> {
        self.history.iter().rev()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
