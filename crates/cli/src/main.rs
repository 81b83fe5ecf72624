use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use session::{ApplicationMode, Designation, MODIFIERS};
use veogen::{
    ClientConfig, CredentialStore, FileCredentialStore, GeminiClient, GenerationError,
    Orchestrator, PollPolicy,
};

#[derive(Parser)]
#[command(name = "veogen")]
#[command(about = "Prompt-to-video studio - generate videos with the Veo models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the API credential
    SetKey {
        key: String,
    },

    /// Remove the stored API credential
    ClearKey,

    /// Rewrite a prompt into a cinematic paragraph
    Enhance {
        prompt: String,
    },

    /// Generate a video from a prompt and optional designated images
    Generate {
        prompt: String,

        /// Image file used as the first frame
        #[arg(long)]
        start: Option<PathBuf>,

        /// Image file used as the last frame
        #[arg(long)]
        end: Option<PathBuf>,

        /// Reference image file (repeatable)
        #[arg(long = "reference")]
        references: Vec<PathBuf>,

        /// Prompt modifier to toggle on, e.g. "Cinematic" (repeatable)
        #[arg(long = "modifier")]
        modifiers: Vec<String>,

        /// Output file (defaults to veogen_<timestamp>.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds between status polls
        #[arg(long, default_value = "5")]
        poll_interval: u64,

        /// Give up after this many polls
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Generate a still image from a prompt
    Image {
        prompt: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the prompt modifier catalog
    Modifiers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::SetKey { key } => set_key_command(&key),
        Commands::ClearKey => clear_key_command(),
        Commands::Enhance { prompt } => enhance_command(prompt).await,
        Commands::Generate {
            prompt,
            start,
            end,
            references,
            modifiers,
            output,
            poll_interval,
            max_attempts,
        } => {
            let policy = PollPolicy {
                interval: Duration::from_secs(poll_interval),
                max_attempts,
            };
            generate_command(prompt, start, end, references, modifiers, output, policy).await
        }
        Commands::Image { prompt, output } => image_command(prompt, output).await,
        Commands::Modifiers => modifiers_command(),
    }
}

fn build_orchestrator(
    policy: PollPolicy,
) -> Result<Orchestrator<GeminiClient, FileCredentialStore>> {
    let client = GeminiClient::new(ClientConfig::new())?;
    let store = FileCredentialStore::new();
    Ok(Orchestrator::new(client, store).with_poll_policy(policy))
}

fn set_key_command(key: &str) -> Result<()> {
    FileCredentialStore::new().set(key)?;
    info!("credential stored");
    Ok(())
}

fn clear_key_command() -> Result<()> {
    FileCredentialStore::new().clear();
    info!("credential cleared");
    Ok(())
}

async fn enhance_command(prompt: String) -> Result<()> {
    let mut orchestrator = build_orchestrator(PollPolicy::default())?;
    ensure_credential(&orchestrator)?;
    orchestrator.set_prompt(&prompt);

    match orchestrator.enhance_prompt().await {
        Ok(()) => {
            println!("{}", orchestrator.session().prompt.text());
            Ok(())
        }
        Err(GenerationError::MissingCredential) => {
            bail!("no credential stored; run `veogen set-key <KEY>` first")
        }
        Err(err) => Err(err.into()),
    }
}

async fn generate_command(
    prompt: String,
    start: Option<PathBuf>,
    end: Option<PathBuf>,
    references: Vec<PathBuf>,
    modifiers: Vec<String>,
    output: Option<PathBuf>,
    policy: PollPolicy,
) -> Result<()> {
    let mut orchestrator = build_orchestrator(policy)?;
    ensure_credential(&orchestrator)?;
    orchestrator.set_prompt(&prompt);

    for name in &modifiers {
        if session::modifier(name).is_none() {
            warn!("unknown modifier '{}', skipping", name);
            continue;
        }
        orchestrator.toggle_modifier(name);
    }

    if let Some(path) = &start {
        let id = add_image_file(&mut orchestrator, path)?;
        orchestrator.set_designation(id, Designation::Start);
    }
    if let Some(path) = &end {
        let id = add_image_file(&mut orchestrator, path)?;
        orchestrator.set_designation(id, Designation::End);
    }
    for path in &references {
        let id = add_image_file(&mut orchestrator, path)?;
        orchestrator.set_designation(id, Designation::Reference);
    }

    info!("submitting generation job");
    match orchestrator.generate_video().await {
        Ok(()) => {}
        Err(GenerationError::MissingCredential) => {
            bail!("no credential stored; run `veogen set-key <KEY>` first")
        }
        Err(GenerationError::CredentialInvalid(message)) => {
            bail!("credential rejected and cleared; store a new one ({message})")
        }
        Err(err) => return Err(err.into()),
    }

    let session = orchestrator.session();
    let video = session
        .latest_first()
        .next()
        .context("generation reported success but produced no video")?;

    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "veogen_{}.mp4",
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        ))
    });
    fs::write(&path, &video.media)
        .with_context(|| format!("write video to {}", path.display()))?;
    info!("video written to {}", path.display());
    Ok(())
}

async fn image_command(prompt: String, output: PathBuf) -> Result<()> {
    let mut orchestrator = build_orchestrator(PollPolicy::default())?;

    match orchestrator.generate_still_image(&prompt).await {
        Ok(()) => {}
        Err(GenerationError::MissingCredential) => {
            bail!("no credential stored; run `veogen set-key <KEY>` first")
        }
        Err(err) => return Err(err.into()),
    }

    let Some(pending) = &orchestrator.session().pending_image else {
        bail!("no image was produced");
    };
    let bytes = STANDARD
        .decode(&pending.payload)
        .context("decode image payload")?;
    fs::write(&output, bytes)
        .with_context(|| format!("write image to {}", output.display()))?;
    info!("image ({}) written to {}", pending.media_type, output.display());
    Ok(())
}

fn modifiers_command() -> Result<()> {
    for modifier in MODIFIERS {
        println!("{:<20} {}", modifier.name, modifier.description);
    }
    Ok(())
}

fn ensure_credential<B, C>(orchestrator: &Orchestrator<B, C>) -> Result<()>
where
    B: veogen::GenerationBackend,
    C: CredentialStore,
{
    if orchestrator.session().mode == ApplicationMode::NeedsCredential {
        bail!("no credential stored; run `veogen set-key <KEY>` first");
    }
    Ok(())
}

fn add_image_file<B, C>(
    orchestrator: &mut Orchestrator<B, C>,
    path: &Path,
) -> Result<session::AssetId>
where
    B: veogen::GenerationBackend,
    C: CredentialStore,
{
    let bytes = fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    let payload = STANDARD.encode(bytes);
    Ok(orchestrator.add_image(payload, mime_for(path).to_string()))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}
