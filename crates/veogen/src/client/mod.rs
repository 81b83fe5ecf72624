/// Remote service abstraction
///
/// The orchestration core talks to the generation backend through this
/// trait so tests can script the protocol without HTTP. `GeminiClient` is
/// the production implementation.
pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::{ClientConfig, GeminiClient};

use crate::error::GenerationError;
use crate::planner::RequestPayload;

/// An already-encoded image on the wire: opaque base64 content plus its
/// declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub data: String,
    pub media_type: String,
}

/// Opaque token identifying an in-flight remote generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle(pub String);

/// One poll of a long-running operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPoll {
    pub done: bool,
    /// Present only when the job finished with a usable result.
    pub media_uri: Option<String>,
}

/// The remote operations the core depends on. Every call is scoped with
/// the caller-supplied credential; failures carry the upstream message so
/// the classifier can inspect it.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Rewrites free text into an enhanced prompt.
    async fn enhance_prompt(
        &self,
        credential: &str,
        prompt: &str,
    ) -> Result<String, GenerationError>;

    /// Synthesizes one still image from a text prompt.
    async fn generate_image(
        &self,
        credential: &str,
        prompt: &str,
    ) -> Result<ImagePayload, GenerationError>;

    /// Submits a video generation job and returns its operation handle.
    async fn create_video_job(
        &self,
        credential: &str,
        payload: &RequestPayload,
    ) -> Result<OperationHandle, GenerationError>;

    /// Queries the status of an in-flight job.
    async fn poll_video_job(
        &self,
        credential: &str,
        handle: &OperationHandle,
    ) -> Result<JobPoll, GenerationError>;

    /// Fetches the finished media over a credential-scoped transfer.
    async fn fetch_media(&self, credential: &str, uri: &str) -> Result<Vec<u8>, GenerationError>;
}
