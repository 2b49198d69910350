/// Loopdeck - looping playlist player for the terminal
use clap::Parser;
use loopdeck_cli::{Command, LoopdeckConfig, Session};
use loopdeck_engine::Direction;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loopdeck")]
#[command(about = "Loop a playlist of local audio files", long_about = None)]
struct Cli {
    /// Audio files to load at startup
    files: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "LOOPDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Start in reverse direction
    #[arg(short, long)]
    reverse: bool,

    /// Start playing right after loading
    #[arg(short, long)]
    autoplay: bool,

    /// Print engine events as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = LoopdeckConfig::load(cli.config.as_deref())?;
    if cli.reverse {
        config.engine.initial_direction = Direction::Reverse;
    }
    if cli.json {
        config.log.json_events = true;
    }
    config.validate()?;

    // Initialize tracing on stderr; stdout belongs to the renderer
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Loopdeck");
    tracing::info!("Direction: {}", config.engine.initial_direction);
    tracing::info!("Accepted types: {:?}", config.media.accepted_media_types);

    let mut session = Session::new(&config, std::io::stdout())?;
    if !cli.files.is_empty() {
        session.import(cli.files)?;
    }
    if cli.autoplay {
        session.apply(Command::TogglePlay)?;
    }

    session.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
