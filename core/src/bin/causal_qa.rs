//! `causal-qa`: batch question generation over simulated scenes
//!
//! Walks every requested scenario × setting pair, reading
//! `<data-root>/synthetic/<scenario>/<setting>/simulations/*.json` and
//! writing `questions/questions_<index>.json` beside it.
//!
//! ```text
//! causal-qa [--data-root data] [--scenario all] [--setting all] [--seed 42] [--sequential]
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use causal_scene_core::{GeneratorConfig, QaGenerator, RunSummary, ScenarioKind, Setting};

/// Generate causal-reasoning questions for simulated collision scenes.
#[derive(Parser)]
#[command(name = "causal-qa", version, about)]
struct Args {
    /// Root of the data tree.
    #[arg(long, default_value = "data")]
    data_root: PathBuf,

    /// Scenario to process, repeatable; `all` selects every topology.
    #[arg(long = "scenario", default_value = "all")]
    scenarios: Vec<String>,

    /// Distractor setting, repeatable; `all` selects every setting.
    #[arg(long = "setting", default_value = "all")]
    settings: Vec<String>,

    /// Seed for option shuffling.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Process scenes on one thread.
    #[arg(long)]
    sequential: bool,

    /// JSON configuration supplying the data root, seed and parallelism.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn expand<T: Copy + std::str::FromStr>(values: &[String], all: &[T]) -> Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if values.iter().any(|value| value == "all") {
        return Ok(all.to_vec());
    }
    values
        .iter()
        .map(|value| value.parse::<T>().map_err(anyhow::Error::from))
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let base = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GeneratorConfig {
            data_root: args.data_root.clone(),
            seed: args.seed,
            parallel: !args.sequential,
            ..GeneratorConfig::default()
        },
    };

    let scenarios = expand(&args.scenarios, &ScenarioKind::ALL)?;
    let settings = expand(&args.settings, &Setting::ALL)?;

    let mut total = RunSummary::default();
    for &scenario in &scenarios {
        for &setting in &settings {
            let config = GeneratorConfig {
                scenario,
                setting,
                ..base.clone()
            };
            let summary = QaGenerator::new(config)?
                .run()
                .with_context(|| format!("generating {}/{}", scenario, setting))?;

            total.scenes_loaded += summary.scenes_loaded;
            total.scenes_written += summary.scenes_written;
            total.scenes_skipped += summary.scenes_skipped;
            total.total_questions += summary.total_questions;
        }
    }

    info!(
        "Done: {} scenes loaded, {} written, {} skipped, {} questions",
        total.scenes_loaded, total.scenes_written, total.scenes_skipped, total.total_questions
    );
    Ok(())
}
