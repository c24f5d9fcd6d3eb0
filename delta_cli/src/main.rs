//! Cicada Δ terminal front-end.

mod cli;
mod console;

use anyhow::{bail, Context, Result};
use clap::Parser;
use delta_core::{
    ChallengeRegistry, ChallengeRunner, JsonFileStore, LayerOutcome, Operator, ProgressionStore,
    RunnerSettings, FORM_LOG_LINES,
};
use delta_rules::{render_meter, GameConfig, Handle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::console::StdioOperator;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    debug!(?config, "configuration resolved");

    let store = JsonFileStore::new(&config.store_path)
        .with_seed(config.score_seed)
        .with_log_retention(config.log_retention);
    let registry = ChallengeRegistry::standard();

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => play(&cli, &config, store, registry),
        Commands::Status => status(&cli, &config, &store),
        Commands::Layers => {
            for (index, definition) in registry.iter().enumerate() {
                println!("{:>3}  {}", index + 1, definition.title);
            }
            Ok(())
        }
    }
}

/// Config file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    if let Some(seed) = cli.seed {
        config.rng_seed = Some(seed);
    }
    if let Some(pacing) = cli.pacing_ms {
        config.pacing_ms = pacing;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn resolve_handle(cli: &Cli, operator: &mut dyn Operator) -> Result<Handle> {
    let raw = match &cli.handle {
        Some(raw) => raw.clone(),
        None => match operator.read_line("Enter your handle: ") {
            Some(line) => line,
            None => bail!("no handle entered"),
        },
    };
    Handle::new(&raw).with_context(|| format!("invalid handle `{raw}`"))
}

fn play(
    cli: &Cli,
    config: &GameConfig,
    store: JsonFileStore,
    registry: ChallengeRegistry,
) -> Result<()> {
    let rng = match config.rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut operator = StdioOperator::stdio();
    let handle = resolve_handle(cli, &mut operator)?;
    let store_path = store.path().to_path_buf();

    let mut runner =
        ChallengeRunner::new(store, registry, rng).with_settings(RunnerSettings::from(config));
    let summary = runner
        .run_session(&handle, &mut operator)
        .with_context(|| format!("session failed for store {}", store_path.display()))?;

    info!(
        handle = %summary.handle,
        advanced = summary.layers_advanced(),
        layer = summary.final_progress.layer,
        "session summary"
    );
    let closing = match summary.outcomes.last() {
        Some(LayerOutcome::Abandoned { .. }) => {
            ">> Connection dropped. Progress up to the last layer is saved."
        }
        Some(LayerOutcome::Faulted { .. }) => {
            ">> The layer collapsed. Nothing was lost. Try again later."
        }
        Some(LayerOutcome::BeyondContent { .. }) => ">> There is nothing further down. For now.",
        _ => ">> Session closed.",
    };
    operator.show(closing);
    operator.show(&format!(
        ">> {} layer(s) this session. Now at layer {}. Δ = {}",
        summary.layers_advanced(),
        summary.final_progress.layer + 1,
        summary.final_progress.score
    ));
    Ok(())
}

fn status(cli: &Cli, config: &GameConfig, store: &JsonFileStore) -> Result<()> {
    let mut operator = StdioOperator::stdio();
    let handle = resolve_handle(cli, &mut operator)?;
    let Some(record) = store
        .load(&handle)
        .with_context(|| format!("failed to read store {}", store.path().display()))?
    else {
        println!("No record for `{handle}`.");
        return Ok(());
    };

    println!("Handle:  {}", record.handle);
    println!("Id:      {}", record.id);
    println!("Layer:   {}", record.layer + 1);
    println!("Δ:       {}", record.score);
    println!("Meter:   {}", render_meter(record.score, config.divergence_threshold));
    println!("Since:   {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let recent = record.recent_log(FORM_LOG_LINES);
    if !recent.is_empty() {
        println!("Recent:");
        for entry in recent {
            println!("  {entry}");
        }
    }
    Ok(())
}
