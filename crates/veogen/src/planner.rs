/// Request planning
///
/// Derives the generation request shape from the current prompt and
/// designation state. The mode decision is a strict priority: any
/// Start/End frame wins, then references, then text only. Prompt
/// validation is the orchestrator's job, not the planner's; the planner is
/// total over any store state the exclusivity invariant allows.
use serde::{Deserialize, Serialize};
use std::fmt;

use session::{Designation, DesignationStore, ImageAsset};

use crate::client::ImagePayload;

/// Fixed output configuration; not derived from input.
pub const ASPECT_RATIO: &str = "16:9";
pub const RESOLUTION: &str = "720p";
pub const SAMPLE_COUNT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    /// No attached media.
    TextOnly,
    /// First and/or last frame seeded from designated images.
    FrameAnchored,
    /// One or more asset-typed reference images.
    ReferenceGuided,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextOnly => write!(f, "text-only"),
            Self::FrameAnchored => write!(f, "frame-anchored"),
            Self::ReferenceGuided => write!(f, "reference-guided"),
        }
    }
}

/// Per-mode service configuration. A lookup table, not business logic:
/// which declared model each mode targets and what the service accepts.
#[derive(Debug, Clone, Copy)]
pub struct ModeProfile {
    pub model: &'static str,
    pub max_anchor_frames: usize,
    pub max_reference_images: usize,
}

impl GenerationMode {
    pub fn profile(self) -> ModeProfile {
        match self {
            Self::TextOnly => ModeProfile {
                model: "veo-3.1-fast-generate-preview",
                max_anchor_frames: 0,
                max_reference_images: 0,
            },
            Self::FrameAnchored => ModeProfile {
                model: "veo-3.1-generate-preview",
                max_anchor_frames: 2,
                max_reference_images: 0,
            },
            Self::ReferenceGuided => ModeProfile {
                model: "veo-3.1-generate-preview",
                max_anchor_frames: 0,
                max_reference_images: 3,
            },
        }
    }
}

/// The planned request for one generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayload {
    pub prompt: String,
    pub model: String,
    pub mode: GenerationMode,
    pub start_frame: Option<ImagePayload>,
    pub end_frame: Option<ImagePayload>,
    /// Asset-typed references, in insertion order.
    pub reference_images: Vec<ImagePayload>,
    pub aspect_ratio: String,
    pub resolution: String,
    pub sample_count: u32,
}

fn to_payload(asset: &ImageAsset) -> ImagePayload {
    ImagePayload {
        data: asset.payload.clone(),
        media_type: asset.media_type.clone(),
    }
}

/// Plans a request from the prompt and the current designations.
pub fn plan(prompt: &str, store: &DesignationStore) -> RequestPayload {
    let start = store.start();
    let end = store.end();
    let references = store.query(Designation::Reference);

    let mode = if start.is_some() || end.is_some() {
        GenerationMode::FrameAnchored
    } else if !references.is_empty() {
        GenerationMode::ReferenceGuided
    } else {
        GenerationMode::TextOnly
    };
    let profile = mode.profile();

    let (start_frame, end_frame, reference_images) = match mode {
        GenerationMode::FrameAnchored => (start.map(to_payload), end.map(to_payload), Vec::new()),
        GenerationMode::ReferenceGuided => {
            // The service rejects requests carrying more references than
            // the model accepts; keep the earliest-designated ones.
            let images = references
                .into_iter()
                .take(profile.max_reference_images)
                .map(to_payload)
                .collect();
            (None, None, images)
        }
        GenerationMode::TextOnly => (None, None, Vec::new()),
    };
    debug_assert!(
        start_frame.iter().count() + end_frame.iter().count() <= profile.max_anchor_frames,
        "anchor frames exceed the {mode} profile"
    );

    RequestPayload {
        prompt: prompt.to_string(),
        model: profile.model.to_string(),
        mode,
        start_frame,
        end_frame,
        reference_images,
        aspect_ratio: ASPECT_RATIO.to_string(),
        resolution: RESOLUTION.to_string(),
        sample_count: SAMPLE_COUNT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::AssetId;

    fn store_with(n: usize) -> (DesignationStore, Vec<AssetId>) {
        let mut store = DesignationStore::new();
        let ids = (0..n)
            .map(|i| {
                let asset = ImageAsset::new(format!("payload-{i}"), "image/png");
                let id = asset.id;
                store.add(asset);
                id
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn test_no_designations_plans_text_only() {
        let (store, _) = store_with(2);
        let payload = plan("a cat on a skateboard", &store);
        assert_eq!(payload.mode, GenerationMode::TextOnly);
        assert_eq!(payload.model, "veo-3.1-fast-generate-preview");
        assert!(payload.start_frame.is_none());
        assert!(payload.end_frame.is_none());
        assert!(payload.reference_images.is_empty());
    }

    #[test]
    fn test_start_only_plans_frame_anchored() {
        let (mut store, ids) = store_with(1);
        store.set_designation(ids[0], Designation::Start);
        let payload = plan("p", &store);
        assert_eq!(payload.mode, GenerationMode::FrameAnchored);
        assert_eq!(payload.model, "veo-3.1-generate-preview");
        assert!(payload.start_frame.is_some());
        assert!(payload.end_frame.is_none());
    }

    #[test]
    fn test_start_and_end_plans_both_frames() {
        let (mut store, ids) = store_with(2);
        store.set_designation(ids[0], Designation::Start);
        store.set_designation(ids[1], Designation::End);
        let payload = plan("p", &store);
        assert_eq!(payload.mode, GenerationMode::FrameAnchored);
        assert_eq!(payload.start_frame.unwrap().data, "payload-0");
        assert_eq!(payload.end_frame.unwrap().data, "payload-1");
    }

    #[test]
    fn test_references_plan_reference_guided_in_order() {
        let (mut store, ids) = store_with(3);
        store.set_designation(ids[0], Designation::Reference);
        store.set_designation(ids[2], Designation::Reference);
        let payload = plan("p", &store);
        assert_eq!(payload.mode, GenerationMode::ReferenceGuided);
        let data: Vec<&str> = payload
            .reference_images
            .iter()
            .map(|i| i.data.as_str())
            .collect();
        assert_eq!(data, vec!["payload-0", "payload-2"]);
    }

    #[test]
    fn test_frames_win_over_references() {
        let (mut store, ids) = store_with(2);
        store.set_designation(ids[0], Designation::Reference);
        store.set_designation(ids[1], Designation::End);
        let payload = plan("p", &store);
        assert_eq!(payload.mode, GenerationMode::FrameAnchored);
        assert!(payload.reference_images.is_empty());
        assert!(payload.start_frame.is_none());
        assert!(payload.end_frame.is_some());
    }

    #[test]
    fn test_references_beyond_model_limit_are_dropped() {
        let (mut store, ids) = store_with(5);
        for id in &ids[..4] {
            store.set_designation(*id, Designation::Reference);
        }
        let payload = plan("p", &store);
        assert_eq!(payload.mode, GenerationMode::ReferenceGuided);
        let limit = GenerationMode::ReferenceGuided.profile().max_reference_images;
        assert_eq!(payload.reference_images.len(), limit);
        let data: Vec<&str> = payload
            .reference_images
            .iter()
            .map(|i| i.data.as_str())
            .collect();
        assert_eq!(data, vec!["payload-0", "payload-1", "payload-2"]);
    }

    #[test]
    fn test_fixed_output_configuration() {
        let (store, _) = store_with(0);
        let payload = plan("p", &store);
        assert_eq!(payload.aspect_ratio, "16:9");
        assert_eq!(payload.resolution, "720p");
        assert_eq!(payload.sample_count, 1);
    }
}
