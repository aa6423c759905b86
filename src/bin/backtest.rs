use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use gridiron::config::EngineConfig;
use gridiron::file::ReadJsonFile;
use gridiron::game::Schedule;
use gridiron::print::{
    tabulate_confidence, tabulate_leaderboard, tabulate_predictions, tabulate_seasons,
};
use gridiron::sim::Simulator;
use gridiron::{csv, file};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file or directory to source the games from
    games: Option<PathBuf>,

    /// engine configuration (JSON); defaults apply if omitted
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// replay games up to and including this season
    #[clap(short = 's', long)]
    season: Option<u16>,

    /// number of leaderboard rows to print
    #[clap(short = 't', long, default_value_t = 32)]
    top: usize,

    /// write every prediction to this CSV file
    #[clap(short = 'p', long)]
    predictions: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.games
            .as_ref()
            .ok_or(anyhow!("games file or directory must be specified"))?;
        Ok(())
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

    let config = match &args.config {
        None => EngineConfig::default(),
        Some(path) => {
            debug!("loading config from {}", path.display());
            EngineConfig::read_json_file(path)?
        }
    };
    debug!("config: {config:?}");

    let mut schedule = Schedule::from(file::read_games(args.games.unwrap())?);
    if let Some(season) = args.season {
        schedule.retain(|game| game.season <= season);
    }
    info!(
        "loaded {} games across seasons {:?}",
        schedule.len(),
        schedule.seasons()
    );

    let start_time = Instant::now();
    let mut simulator = Simulator::try_from(config)?;
    simulator.replay(&schedule)?;
    let upcoming = schedule
        .upcoming()
        .map(|game| simulator.predict(game))
        .collect::<Result<Vec<_>, _>>()?;
    let backtest = simulator.finish();
    let elapsed = start_time.elapsed();
    info!(
        "replayed {} games in {:.3}s ({} unplayed, {} skipped, {} tied)",
        backtest.predictions.len(),
        elapsed.as_millis() as f64 / 1_000.,
        backtest.unplayed,
        backtest.skipped.len(),
        backtest.accuracy.ties
    );
    for skipped in &backtest.skipped {
        warn!("skipped game {}: {}", skipped.game_id, skipped.reason);
    }

    info!(
        "accuracy by confidence:\n{}",
        Console::default().render(&tabulate_confidence(&backtest.accuracy))
    );
    info!(
        "accuracy by season:\n{}",
        Console::default().render(&tabulate_seasons(&backtest.accuracy))
    );
    info!(
        "overall accuracy: {:.4}, Brier score: {:.4} over {} games",
        backtest.accuracy.accuracy(),
        backtest.accuracy.brier_score(),
        backtest.accuracy.scored_games()
    );
    info!(
        "leaderboard:\n{}",
        Console::default().render(&tabulate_leaderboard(&backtest.leaderboard, args.top))
    );
    if !upcoming.is_empty() {
        info!(
            "upcoming:\n{}",
            Console::default().render(&tabulate_predictions(&upcoming))
        );
    }

    if let Some(path) = args.predictions {
        csv::write_predictions(&path, &backtest.predictions)?;
        info!(
            "wrote {} predictions to {}",
            backtest.predictions.len(),
            path.display()
        );
    }
    Ok(())
}
