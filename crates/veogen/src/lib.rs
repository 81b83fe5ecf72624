/// Generation orchestration core
///
/// Decides which generation mode to invoke from the current prompt and
/// image designations, shapes the request payload, drives the remote
/// submit/poll/fetch protocol, classifies failures, and exposes the
/// orchestrated use cases the presentation layer calls.
pub mod client;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod poller;

pub use client::{
    ClientConfig, GeminiClient, GenerationBackend, ImagePayload, JobPoll, OperationHandle,
};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{classify, ErrorClass, GenerationError};
pub use orchestrator::{Orchestrator, SessionEvent};
pub use planner::{plan, GenerationMode, ModeProfile, RequestPayload};
pub use poller::{run_job, PollPolicy, Sleeper, TokioSleeper};
