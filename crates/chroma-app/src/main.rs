use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chroma_app::autoplay::Autopilot;
use chroma_app::error::AppError;
use chroma_app::game_loop::{spawn_game_loop, LoopOptions};
use chroma_core::config::GameConfig;
use chroma_core::constants::DEFAULT_SEED;
use chroma_sim::persistence::JsonFileStore;
use chroma_sim::{SimConfig, SimulationEngine};

/// Run a CHROMA DEFENSE game headlessly.
#[derive(Debug, Parser)]
#[command(name = "chroma", version)]
struct Args {
    /// RNG seed. Same seed and commands give the same game.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// JSON file overriding the default balance config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// End in victory after this many waves instead of running endless.
    #[arg(long)]
    waves: Option<u32>,

    /// Save slot to resume from and autosave to.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Pace ticks to wall-clock time.
    #[arg(long)]
    realtime: bool,

    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Disable the autopilot. Without it the game idles in the build phase.
    #[arg(long)]
    manual: bool,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "chroma failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_path(path)?,
        None => GameConfig::default(),
    };
    if args.waves.is_some() {
        config.player.max_waves = args.waves;
    }
    let tower_cost = config.player.tower_cost;
    let max_waves = config.player.max_waves;

    let mut engine = SimulationEngine::new(SimConfig {
        seed: args.seed,
        config,
    })?;
    if let Some(path) = &args.save {
        engine = engine.with_persistence(Box::new(JsonFileStore::new(path).with_max_wave(max_waves)));
    }
    tracing::info!(seed = args.seed, wave = engine.context().ledger.wave, "starting game");

    let options = LoopOptions {
        realtime: args.realtime,
        max_ticks: args.max_ticks,
        autopilot: (!args.manual).then(|| Autopilot::new(tower_cost)),
    };
    let report = spawn_game_loop(engine, options)?.join()?;

    match &report.final_snapshot {
        Some(snapshot) => {
            tracing::info!(
                ticks = report.ticks,
                phase = ?snapshot.phase,
                wave = snapshot.wave.number,
                score = snapshot.economy.score,
                best_score = snapshot.economy.best_score,
                "run finished"
            );
            if args.json {
                println!("{}", serde_json::to_string_pretty(snapshot)?);
            }
        }
        None => tracing::warn!("run ended before the first tick"),
    }
    Ok(())
}
