//! Scribe - agent orchestration for audio transcripts
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use scribe::{Config, Orchestrator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Scribe - transcribe, clean, validate, and summarize an audio file with a team of agents
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Audio file to process (mp3, wav, m4a, flac)
    audio_file: PathBuf,

    /// Agent configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Root agent to run instead of the configured one
    #[arg(long, short = 'r')]
    root: Option<String>,

    /// Maximum backend requests per agent run
    #[arg(long)]
    max_turns: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "scribe=debug" } else { "scribe=info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Build configuration
    let mut config = Config::load(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(root) = args.root {
        config.set_main(root);
    }

    if let Some(max_turns) = args.max_turns {
        config.engine.max_turns = max_turns;
    }

    if args.debug {
        config.engine.debug = true;
    }

    config.validate()?;

    let orchestrator = Orchestrator::from_config(config)?;
    orchestrator.set_artifact(&args.audio_file)?;
    orchestrator.start_default_transcription()?;

    let answer = orchestrator.run_main(None).await?;
    println!("{}", answer);

    Ok(())
}
