//! Bot Arena
//!
//! Command line front end: run a single match to the end, or keep a match
//! ticking in the background and add bots to it while it runs.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use arena_core::bots::BotOptions;
use arena_core::config::{ArenaConfig, BotSpec};
use arena_core::setup::{bot_seed, build_engine};
use arena_core::{
    ArenaError, BotRegistry, FanoutSink, JsonlSink, LogSink, MatchController, MatchHandle,
    PersistentMatch,
};
use arena_events::RoundEvent;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the arena
#[derive(Parser, Debug)]
#[command(name = "bot_arena")]
#[command(about = "Pit bots against each other on a square grid")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one match until a single bot is left
    Run(MatchArgs),
    /// Keep a match ticking and accept new bots on stdin
    Serve(ServeArgs),
    /// List the available bot kinds
    Bots,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Bot kind to add to the roster (repeatable)
    #[arg(long = "bot", value_name = "KIND")]
    bots: Vec<String>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Side length of the board
    #[arg(long)]
    board_size: Option<u32>,

    /// Give up after this many rounds
    #[arg(long)]
    max_rounds: Option<u64>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    match_args: MatchArgs,

    /// Milliseconds between rounds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Append every round's snapshot to this JSONL file
    #[arg(long)]
    snapshot_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let registry = BotRegistry::with_builtins();

    let outcome = match cli.command {
        Command::Bots => {
            for kind in registry.kinds() {
                println!("{}", kind);
            }
            Ok(())
        }
        Command::Run(args) => {
            load_config(cli.config.as_ref(), &args).and_then(|config| run(&config, &registry))
        }
        Command::Serve(args) => match load_config(cli.config.as_ref(), &args.match_args) {
            Ok(mut config) => {
                if let Some(tick_ms) = args.tick_ms {
                    config.server.tick_interval_ms = tick_ms;
                }
                if args.snapshot_log.is_some() {
                    config.server.snapshot_log = args.snapshot_log;
                }
                match config.validate() {
                    Ok(()) => serve(config, registry).await,
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e),
        },
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Read the config file (if any) and apply command line overrides on top
fn load_config(path: Option<&PathBuf>, args: &MatchArgs) -> Result<ArenaConfig, ArenaError> {
    let mut config = match path {
        Some(path) => ArenaConfig::from_file(path)?,
        None => ArenaConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.arena.seed = Some(seed);
    }
    if let Some(board_size) = args.board_size {
        config.arena.board_size = board_size;
    }
    if args.max_rounds.is_some() {
        config.arena.max_rounds = args.max_rounds;
    }
    config
        .bots
        .extend(args.bots.iter().map(|kind| BotSpec::of_kind(kind.as_str())));

    config.validate()?;
    Ok(config)
}

fn run(config: &ArenaConfig, registry: &BotRegistry) -> Result<(), ArenaError> {
    if config.bots.len() < 2 {
        return Err(ArenaError::NotEnoughBots(config.bots.len()));
    }

    let seed = config.arena.seed.unwrap_or_else(rand::random);
    println!("Bot Arena");
    println!("=========");
    println!("Seed: {}", seed);
    println!("Board: {0}x{0}", config.arena.board_size);
    println!();

    let engine = build_engine(config, registry, seed)?;
    let mut controller = MatchController::new(engine).with_max_rounds(config.arena.max_rounds);

    let result = controller.run_with(|report| {
        println!("Round {}", report.snapshot.round);
        for event in &report.events {
            match event {
                RoundEvent::Moved {
                    agent,
                    direction,
                    to,
                    ..
                } => println!("  {} moves {} to {}", agent, direction, to),
                RoundEvent::Attacked {
                    agent,
                    target,
                    target_health,
                    ..
                } => println!("  {} shoots {}. {} HP: {}", agent, target, target, target_health),
                RoundEvent::DecisionFailed { agent, reason } => {
                    println!("  {} raised an error: {}", agent, reason)
                }
                RoundEvent::Rejected { .. } => {}
            }
        }
    });

    println!();
    println!("{}", result);
    Ok(())
}

async fn serve(config: ArenaConfig, registry: BotRegistry) -> Result<(), ArenaError> {
    let seed = config.arena.seed.unwrap_or_else(rand::random);
    let engine = build_engine(&config, &registry, seed)?;

    let mut sink = FanoutSink::new().with(LogSink);
    if let Some(path) = &config.server.snapshot_log {
        sink = sink.with(JsonlSink::create(path)?);
        info!(path = %path.display(), "writing snapshots");
    }

    let running = PersistentMatch::spawn(engine, config.server.tick_interval(), sink);
    let handle = running.handle();
    let console = tokio::spawn(handle_commands(
        stdin_lines(),
        handle.clone(),
        Arc::new(registry),
        seed,
        config.bots.len(),
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted, stopping at the next round boundary"),
        _ = handle.stopped() => {}
    }

    console.abort();
    let snapshot = running.shutdown().await?;
    info!(round = snapshot.round, winner = ?snapshot.winner(), "final state");
    Ok(())
}

/// Lines typed on stdin. Read on a plain thread so a pending read never holds
/// up runtime shutdown.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    break;
                }
            }
        }
    });
    rx
}

/// Console commands: `add <kind> [name]`, `state`, `stop`
async fn handle_commands(
    mut lines: mpsc::Receiver<String>,
    handle: MatchHandle,
    registry: Arc<BotRegistry>,
    seed: u64,
    mut spawned: usize,
) {
    while let Some(line) = lines.recv().await {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("add") => {
                let Some(kind) = words.next() else {
                    warn!("usage: add <kind> [name]");
                    continue;
                };
                let mut options = BotOptions::seeded(bot_seed(seed, spawned));
                options.name = words.next().map(str::to_string);
                spawned += 1;

                match registry.create(kind, &options) {
                    Ok(bot) => match handle.register_agent(bot).await {
                        Ok(name) => info!(agent = %name, kind, "joined the arena"),
                        Err(e) => warn!(kind, error = %e, "could not add bot"),
                    },
                    Err(e) => warn!(error = %e, "could not add bot"),
                }
            }
            Some("state") => match serde_json::to_string(&handle.snapshot().await) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!(error = %e, "could not encode snapshot"),
            },
            Some("stop") => {
                handle.stop();
                return;
            }
            Some(other) => warn!(command = other, "unknown command"),
            None => {}
        }
    }
}
