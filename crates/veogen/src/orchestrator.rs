/// Use-case orchestration
///
/// The only entry points the presentation layer calls. Owns the `Session`
/// value and replaces it on each transition; subscribers receive the new
/// snapshot (and surfaced failure messages) over a channel. The coarse
/// `ApplicationMode` gates enhance/generate, while the still-image flow
/// runs on its own busy flag.
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};

use session::{
    ApplicationMode, AssetId, Designation, GeneratedVideo, ImageAsset, Session,
};

use crate::client::GenerationBackend;
use crate::credentials::CredentialStore;
use crate::error::{classify, ErrorClass, GenerationError};
use crate::planner::plan;
use crate::poller::{run_job, PollPolicy, Sleeper, TokioSleeper};

/// Pushed to subscribers whenever the session value changes or a failure is
/// surfaced to the user.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Updated(Session),
    Failure(String),
}

pub struct Orchestrator<B, C> {
    backend: B,
    credentials: C,
    poll: PollPolicy,
    sleeper: Box<dyn Sleeper>,
    session: Session,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl<B: GenerationBackend, C: CredentialStore> Orchestrator<B, C> {
    pub fn new(backend: B, credentials: C) -> Self {
        let mut session = Session::new();
        if credentials.get().is_some() {
            session.mode = ApplicationMode::Idle;
        }
        Self {
            backend,
            credentials,
            poll: PollPolicy::default(),
            sleeper: Box::new(TokioSleeper),
            session,
            subscribers: Vec::new(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Current snapshot.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Registers a subscriber; closed receivers are pruned on send.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self) {
        let snapshot = self.session.clone();
        self.subscribers
            .retain(|tx| tx.send(SessionEvent::Updated(snapshot.clone())).is_ok());
    }

    fn surface(&mut self, message: &str) {
        warn!("{message}");
        self.subscribers
            .retain(|tx| tx.send(SessionEvent::Failure(message.to_string())).is_ok());
    }

    fn set_mode(&mut self, mode: ApplicationMode) {
        self.session.mode = mode;
        self.publish();
    }

    /// Lazily fetches the credential; an empty store forces re-entry.
    fn credential(&mut self) -> Result<String, GenerationError> {
        match self.credentials.get() {
            Some(key) => Ok(key),
            None => {
                self.set_mode(ApplicationMode::NeedsCredential);
                Err(GenerationError::MissingCredential)
            }
        }
    }

    /// Stores an accepted credential and unlocks the session.
    pub fn accept_credential(&mut self, key: &str) -> Result<(), GenerationError> {
        self.credentials.set(key)?;
        if self.session.mode == ApplicationMode::NeedsCredential {
            self.session.mode = ApplicationMode::Idle;
        }
        self.publish();
        Ok(())
    }

    // ---- state mutators the presentation layer delegates to ----

    pub fn add_image(&mut self, payload: String, media_type: String) -> AssetId {
        let asset = ImageAsset::new(payload, media_type);
        let id = asset.id;
        self.session.images.add(asset);
        self.publish();
        id
    }

    pub fn remove_image(&mut self, id: AssetId) {
        self.session.images.remove(id);
        self.publish();
    }

    pub fn set_designation(&mut self, id: AssetId, role: Designation) {
        self.session.images.set_designation(id, role);
        self.publish();
    }

    pub fn set_prompt(&mut self, text: &str) {
        self.session.prompt.set_text(text);
        self.publish();
    }

    pub fn toggle_modifier(&mut self, name: &str) -> bool {
        let active = self.session.prompt.toggle_modifier(name);
        self.publish();
        active
    }

    // ---- use cases ----

    /// Rewrites the current prompt through the remote enhance operation.
    /// An empty prompt is a no-op with no mode transition. The result
    /// overwrites the prompt text one-shot; active modifiers are not
    /// reapplied. Always ends back in `Idle`.
    pub async fn enhance_prompt(&mut self) -> Result<(), GenerationError> {
        let text = self.session.prompt.text().trim().to_string();
        if text.is_empty() || self.session.mode != ApplicationMode::Idle {
            return Ok(());
        }
        let credential = self.credential()?;

        self.set_mode(ApplicationMode::EnhancingPrompt);
        let result = self.backend.enhance_prompt(&credential, &text).await;
        let outcome = match result {
            Ok(enhanced) => {
                self.session.prompt.set_text(enhanced);
                Ok(())
            }
            Err(err) => {
                self.surface(&err.to_string());
                Err(err)
            }
        };
        self.set_mode(ApplicationMode::Idle);
        outcome
    }

    /// Plans a request from the current prompt and designations, runs the
    /// submit/poll/fetch protocol, and appends the result to the history.
    /// A credential-invalid failure clears the stored key and forces
    /// re-authentication; any other failure surfaces its message and
    /// returns to `Idle`.
    pub async fn generate_video(&mut self) -> Result<(), GenerationError> {
        let prompt = self.session.prompt.text().trim().to_string();
        if prompt.is_empty() || self.session.mode != ApplicationMode::Idle {
            return Ok(());
        }
        let credential = self.credential()?;

        self.set_mode(ApplicationMode::GeneratingVideo);
        let payload = plan(&prompt, &self.session.images);
        info!("generating video: mode={} model={}", payload.mode, payload.model);

        let result = run_job(
            &self.backend,
            &credential,
            &payload,
            &self.poll,
            self.sleeper.as_ref(),
        )
        .await;

        match result {
            Ok(media) => {
                self.session.history.push(GeneratedVideo::new(media, prompt));
                self.set_mode(ApplicationMode::Idle);
                Ok(())
            }
            Err(err) => match classify(&err.to_string()) {
                ErrorClass::CredentialInvalid => {
                    self.credentials.clear();
                    self.surface(&err.to_string());
                    self.set_mode(ApplicationMode::NeedsCredential);
                    Err(GenerationError::CredentialInvalid(err.to_string()))
                }
                ErrorClass::Transient(message) => {
                    self.surface(&message);
                    self.set_mode(ApplicationMode::Idle);
                    Err(err)
                }
            },
        }
    }

    /// Synthesizes a still image and holds it as a pending, uncommitted
    /// asset. Re-invoking discards the previous pending preview; assets
    /// already transferred into the store are never retracted. Runs on its
    /// own busy flag, independent of video generation.
    pub async fn generate_still_image(&mut self, prompt: &str) -> Result<(), GenerationError> {
        if prompt.trim().is_empty() || self.session.image_busy {
            return Ok(());
        }
        let credential = self.credential()?;

        self.session.image_busy = true;
        self.session.pending_image = None;
        self.publish();

        let result = self.backend.generate_image(&credential, prompt.trim()).await;
        self.session.image_busy = false;
        match result {
            Ok(image) => {
                self.session.pending_image =
                    Some(ImageAsset::new(image.data, image.media_type));
                self.publish();
                Ok(())
            }
            Err(err) => {
                self.surface(&err.to_string());
                self.publish();
                Err(err)
            }
        }
    }

    /// Commits the pending still image into the designation store as a new
    /// undesignated asset. Returns the new asset id, or `None` when there
    /// is nothing pending.
    pub fn commit_pending_image(&mut self) -> Option<AssetId> {
        let asset = self.session.pending_image.take()?;
        let id = asset.id;
        self.session.images.add(asset);
        self.publish();
        Some(id)
    }
}
