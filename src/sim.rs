//! Chronological replay of game results.
//!
//! A [Simulator] owns the team state of exactly one run. For every completed game it first predicts
//! the result from the state accumulated over strictly earlier games, records that prediction, and
//! only then folds the result into the state of both teams. Nothing about a game can therefore leak
//! into its own prediction or into the prediction of any earlier game.

use std::borrow::Cow;
use std::collections::BTreeMap;

use strum::EnumCount;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::game::{Game, Schedule, Side};
use crate::predict::{Confidence, Prediction};
use crate::team::{ratio, SeasonTransition, TeamState, TeamStore};
use crate::{component, elo, predict};

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("non-finite probability {probability} for game {game_id} (total {total})")]
    NonFiniteProbability {
        game_id: u64,
        total: f64,
        probability: f64,
    },
}

/// Why a game could not be attributed to two team states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("missing team key")]
    MissingTeam,

    #[error("team {0} cannot play itself")]
    SelfMatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub game_id: u64,
    pub reason: SkipReason,
}

/// Hits and misses over games that produced a winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
}
impl Tally {
    pub fn record(&mut self, hit: bool) {
        if hit {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn decided(&self) -> u32 {
        self.correct + self.incorrect
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct as f64, self.decided() as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accuracy {
    pub overall: Tally,
    pub by_confidence: [Tally; Confidence::COUNT],
    pub by_season: BTreeMap<u16, Tally>,
    /// Tied games; these have no winner and sit outside every tally.
    pub ties: u32,
    brier_sum: f64,
    brier_count: u32,
}
impl Accuracy {
    fn record(&mut self, game: &Game, prediction: &Prediction) {
        let Some(outcome) = game.outcome() else {
            return;
        };
        self.brier_sum += (prediction.home_win_probability - outcome.home_points()).powi(2);
        self.brier_count += 1;
        match outcome.winner() {
            None => self.ties += 1,
            Some(winner) => {
                let hit = winner == prediction.predicted_winner;
                self.overall.record(hit);
                self.by_confidence[prediction.confidence.ordinal()].record(hit);
                self.by_season.entry(game.season).or_default().record(hit);
            }
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.overall.accuracy()
    }

    pub fn confidence(&self, confidence: Confidence) -> &Tally {
        &self.by_confidence[confidence.ordinal()]
    }

    /// Mean squared error of the home-win probability; tied games score the home side ½.
    pub fn brier_score(&self) -> f64 {
        ratio(self.brier_sum, self.brier_count as f64)
    }

    pub fn scored_games(&self) -> u32 {
        self.brier_count
    }
}

/// Final state of a replay.
#[derive(Debug, Clone)]
pub struct Backtest {
    pub predictions: Vec<Prediction>,
    pub leaderboard: Vec<TeamState>,
    pub accuracy: Accuracy,
    pub skipped: Vec<Skipped>,
    pub unplayed: usize,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    config: EngineConfig,
    store: TeamStore,
    predictions: Vec<Prediction>,
    accuracy: Accuracy,
    skipped: Vec<Skipped>,
    unplayed: usize,
    season: Option<u16>,
}
impl Simulator {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &TeamStore {
        &self.store
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn accuracy(&self) -> &Accuracy {
        &self.accuracy
    }

    /// Season of the most recently replayed game.
    pub fn season(&self) -> Option<u16> {
        self.season
    }

    /// Applies `transition` to every team seen so far.
    pub fn transition(&mut self, transition: &SeasonTransition) {
        debug!("applying {transition:?} to {} teams", self.store.len());
        self.store.reset_for_new_period(transition);
    }

    /// Replays a single game. Returns the prediction made for it, or `None` if the game was not
    /// replayed: either it has no final score yet, or its teams could not be resolved.
    pub fn step(&mut self, game: &Game) -> Result<Option<&Prediction>, SimulationError> {
        let Some(score) = game.final_score() else {
            self.unplayed += 1;
            return Ok(None);
        };
        if let Err(reason) = check_teams(game) {
            warn!("skipping game {}: {reason}", game.id);
            self.skipped.push(Skipped {
                game_id: game.id,
                reason,
            });
            return Ok(None);
        }

        // predicting from snapshots leaves the state untouched if the prediction fails
        let prediction = self.predict(game)?;
        if let Some(season) = self.season {
            if season != game.season {
                debug!("season boundary {season} -> {}", game.season);
                let transition = self.config.transition;
                self.transition(&transition);
            }
        }
        self.season = Some(game.season);

        let (home, away) = self.store.pair_mut(&game.home_team, &game.away_team);
        trace!(
            "{game}: p_home={:.4}, {}, scores={}",
            prediction.home_win_probability,
            prediction.confidence,
            prediction.scores
        );
        self.accuracy.record(game, &prediction);

        home.apply_result(&score, Side::Home);
        away.apply_result(&score, Side::Away);
        elo::update(&self.config.elo, home, away, &score);

        self.predictions.push(prediction);
        Ok(self.predictions.last())
    }

    /// Replays every game of a schedule, in its chronological order.
    pub fn replay(&mut self, schedule: &Schedule) -> Result<(), SimulationError> {
        for game in schedule.games() {
            self.step(game)?;
        }
        Ok(())
    }

    /// Predicts a game against the current state without altering it. A game from a later season
    /// than the last one replayed sees the configured season transition applied to both teams.
    pub fn predict(&self, game: &Game) -> Result<Prediction, SimulationError> {
        let crosses_season = matches!(self.season, Some(season) if season != game.season);
        let home = self.snapshot(&game.home_team, crosses_season);
        let away = self.snapshot(&game.away_team, crosses_season);
        make_prediction(&self.config, game, &home, &away)
    }

    /// State of a team as the next game in `crosses_season` would see it. A team not yet in the
    /// store is fresh, and the transition is only applied to teams that already exist, mirroring
    /// the order in which [Simulator::step] transitions the store and then creates teams.
    fn snapshot(&self, team_key: &str, crosses_season: bool) -> Cow<TeamState> {
        match self.store.get(team_key) {
            Some(team) if crosses_season => {
                let mut team = team.clone();
                team.reset_for_new_period(
                    &self.config.transition,
                    self.config.elo.initial_rating,
                );
                Cow::Owned(team)
            }
            Some(team) => Cow::Borrowed(team),
            None => Cow::Owned(TeamState::new(
                team_key,
                self.config.elo.initial_rating,
                self.config.form_window,
            )),
        }
    }

    pub fn finish(self) -> Backtest {
        Backtest {
            leaderboard: self.store.leaderboard(),
            predictions: self.predictions,
            accuracy: self.accuracy,
            skipped: self.skipped,
            unplayed: self.unplayed,
        }
    }
}

impl TryFrom<EngineConfig> for Simulator {
    type Error = anyhow::Error;

    fn try_from(config: EngineConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            store: TeamStore::new(config.elo.initial_rating, config.form_window),
            config,
            predictions: vec![],
            accuracy: Accuracy::default(),
            skipped: vec![],
            unplayed: 0,
            season: None,
        })
    }
}

/// Runs a fresh simulator over the whole schedule.
pub fn backtest(config: EngineConfig, schedule: &Schedule) -> Result<Backtest, anyhow::Error> {
    let mut simulator = Simulator::try_from(config)?;
    simulator.replay(schedule)?;
    Ok(simulator.finish())
}

fn check_teams(game: &Game) -> Result<(), SkipReason> {
    if game.home_team.trim().is_empty() || game.away_team.trim().is_empty() {
        return Err(SkipReason::MissingTeam);
    }
    if game.home_team == game.away_team {
        return Err(SkipReason::SelfMatch(game.home_team.clone()));
    }
    Ok(())
}

fn make_prediction(
    config: &EngineConfig,
    game: &Game,
    home: &TeamState,
    away: &TeamState,
) -> Result<Prediction, SimulationError> {
    let scores = component::score(&config.scoring, home, away);
    let combined = predict::combine(&config.combiner, &config.weights, &scores);
    if !combined.home_win_probability.is_finite() {
        return Err(SimulationError::NonFiniteProbability {
            game_id: game.id,
            total: combined.total,
            probability: combined.home_win_probability,
        });
    }
    Ok(Prediction {
        game_id: game.id,
        season: game.season,
        week: game.week,
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        predicted_winner: combined.predicted_winner,
        home_win_probability: combined.home_win_probability,
        confidence: combined.confidence,
        total: combined.total,
        scores,
        weights: config.weights,
    })
}
