use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use gridiron::config::EngineConfig;
use gridiron::file;
use gridiron::file::ReadJsonFile;
use gridiron::game::Schedule;
use gridiron::opt::{optimise_weights, SimplexSearchConfig, DEFAULT_MAX_CANDIDATES};
use gridiron::print::tabulate_candidates;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file or directory to source the games from
    games: Option<PathBuf>,

    /// base engine configuration (JSON); everything but the weights is held fixed
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// lattice step; must divide 1 evenly
    #[clap(short = 'p', long, default_value_t = 0.05)]
    step: f64,

    /// number of leading candidates to print
    #[clap(short = 'k', long, default_value_t = 10)]
    top_k: usize,

    /// refuse lattices with more candidates than this
    #[clap(short = 'm', long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    max_candidates: usize,

    /// write the best configuration to this JSON file
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.games
            .as_ref()
            .ok_or(anyhow!("games file or directory must be specified"))?;
        self.search_config().validate()?;
        Ok(())
    }

    fn search_config(&self) -> SimplexSearchConfig {
        SimplexSearchConfig {
            step: self.step,
            top_k: self.top_k,
            max_candidates: self.max_candidates,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let base = match &args.config {
        None => EngineConfig::default(),
        Some(path) => EngineConfig::read_json_file(path)?,
    };
    let schedule = Schedule::from(file::read_games(args.games.as_ref().unwrap())?);
    info!(
        "loaded {} games ({} completed)",
        schedule.len(),
        schedule.completed().count()
    );

    let outcome = optimise_weights(&base, &schedule, &args.search_config())?;
    info!(
        "leaders ({} of {} evaluated, {} failed, took {:.3}s):\n{}",
        outcome.leaders.len(),
        outcome.evaluated,
        outcome.failed,
        outcome.elapsed.as_millis() as f64 / 1_000.,
        Console::default().render(&tabulate_candidates(&outcome.leaders))
    );
    info!(
        "baseline weights {} vs best {}",
        base.weights, outcome.best.weights
    );

    if let Some(path) = args.output {
        let best = base.with_weights(outcome.best.weights);
        file::write_json(&path, &best)?;
        info!("wrote best configuration to {}", path.display());
    }
    Ok(())
}
