//! # Console Dungeon Main Entry Point
//!
//! Parses the command line, sets up logging and runs either a single console game or
//! the TCP server over the session registry.

use clap::Parser;
use console_dungeon::transport::{run_console, serve, TransportMode};
use console_dungeon::{
    config, AuditLog, DungeonError, DungeonResult, GameSession, GenerationConfig, IdGenerator,
    JsonLinesAuditLog, LogAuditLog, RegistryConfig, SequentialIdGenerator, SessionRegistry,
    UuidIdGenerator,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Command line arguments for Console Dungeon.
#[derive(Parser, Debug)]
#[command(name = "console-dungeon")]
#[command(about = "A turn-based dungeon crawler played with text commands")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// JSON file with a generation config to use instead of the standard layout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transport: console or serve (web is accepted for serve)
    #[arg(long, env = "IO_STREAM", default_value = "console")]
    mode: TransportMode,

    /// Address of the TCP server
    #[arg(long, default_value = config::DEFAULT_BIND_ADDRESS)]
    bind: String,

    /// Directory for the audit log and the game id counter
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seconds before an idle server session is evicted
    #[arg(long, default_value_t = config::SESSION_EXPIRATION_SECS)]
    expiration_secs: u64,

    /// Maximum number of concurrent server sessions
    #[arg(long, default_value_t = config::MAX_SESSIONS)]
    max_sessions: usize,
}

#[tokio::main]
async fn main() -> DungeonResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Console Dungeon v{}", console_dungeon::VERSION);

    let seed = args.seed.unwrap_or_else(rand::random);
    let generation = match &args.config {
        Some(path) => {
            info!("Loading generation config from {}", path.display());
            let loaded = GenerationConfig::load_from_file(path)?;
            match args.seed {
                Some(seed) => loaded.with_seed(seed),
                None => loaded,
            }
        }
        None => GenerationConfig::new(seed),
    };

    let audit: Arc<dyn AuditLog> = match &args.data_dir {
        Some(dir) => Arc::new(JsonLinesAuditLog::new(dir)?),
        None => Arc::new(LogAuditLog),
    };

    match args.mode {
        TransportMode::Console => run_console_mode(generation, audit),
        TransportMode::Serve => run_server_mode(&args, generation, seed, audit).await,
    }
}

/// Initializes logging based on the configured level.
fn initialize_logging(log_level: &str) -> DungeonResult<()> {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        other => {
            return Err(DungeonError::InvalidConfig(format!(
                "unknown log level '{}'",
                other
            )))
        }
    };

    #[cfg(feature = "dev-tools")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .init();
    }

    Ok(())
}

/// Plays one game on standard input and output.
fn run_console_mode(generation: GenerationConfig, audit: Arc<dyn AuditLog>) -> DungeonResult<()> {
    let id = SequentialIdGenerator::new().next_id()?;
    let mut session = GameSession::new(id, &generation, audit)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_console(&mut session, stdin.lock(), &mut stdout.lock())?;

    if session.is_running() {
        info!("Input closed, ending the game");
        session.end()?;
    }
    Ok(())
}

/// Serves many games over TCP until the process is stopped.
async fn run_server_mode(
    args: &Args,
    generation: GenerationConfig,
    seed: u64,
    audit: Arc<dyn AuditLog>,
) -> DungeonResult<()> {
    let ids: Arc<dyn IdGenerator> = match &args.data_dir {
        Some(dir) => Arc::new(SequentialIdGenerator::persistent(dir)?),
        None => Arc::new(UuidIdGenerator),
    };

    let registry = SessionRegistry::new(
        RegistryConfig {
            expiration: Duration::from_secs(args.expiration_secs),
            max_sessions: args.max_sessions,
            generation,
            seed,
        },
        ids,
        audit,
    )?;

    let listener = TcpListener::bind(&args.bind).await?;
    serve(listener, Arc::new(Mutex::new(registry))).await
}
