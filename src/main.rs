use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voxgate::api::{ApiServer, ApiState};
use voxgate::store::validate_audio;
use voxgate::transcribe::HttpSpeechEngine;
use voxgate::{
    AudioCache, Config, HttpTtsBackend, PresetStore, Synthesizer, Transcriber, VoiceModelStore,
};

/// Voxgate - local voice-model registry and speech synthesis gateway
#[derive(Parser)]
#[command(name = "voxgate", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "VOXGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "VOXGATE_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// List registered voice models
    ListVoices,
    /// Validate an audio file for use as a voice reference
    Validate {
        /// Path to the audio file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voxgate=info",
        1 => "info,voxgate=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref());
    if let Some(port) = cli.port {
        config.port = port;
    }

    match cli.command {
        None | Some(Command::Serve) => serve(config).await,
        Some(Command::ListVoices) => {
            let store = VoiceModelStore::new(&config.models_dir)?;
            for name in store.list() {
                println!("{name}");
            }
            Ok(())
        }
        Some(Command::Validate { path }) => {
            validate_audio(&path)?;
            println!("{}: ok", path.display());
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.ensure_dirs()?;

    let store = VoiceModelStore::new(&config.models_dir)?;
    let presets = PresetStore::new(config.models_dir.join("presets"))?;
    let cache = AudioCache::new(&config.cache_dir)?;

    // Engine handles are built once here and shared; no lazy globals
    let backend = Arc::new(HttpTtsBackend::new(config.tts_url.clone())?);
    let synthesizer = Synthesizer::new(backend, store.clone(), cache, &config.output_dir);

    let engine: Option<Arc<dyn voxgate::SpeechEngine>> = match &config.stt_url {
        Some(url) => Some(Arc::new(HttpSpeechEngine::new(url.clone())?)),
        None => {
            tracing::warn!("no speech-recognition engine configured, transcription disabled");
            None
        }
    };
    let transcriber = Transcriber::new(engine);

    let state = ApiState {
        store,
        presets,
        synthesizer,
        transcriber,
        upload_dir: config.upload_dir.clone(),
        transcript_dir: config.transcript_dir.clone(),
        defaults: config.defaults,
    };

    ApiServer::new(state, config.port).run().await?;
    Ok(())
}
