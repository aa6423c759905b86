//! Per-team running state and the store that owns it for the duration of one simulation.

use std::collections::VecDeque;

use anyhow::bail;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::game::{FinalScore, Outcome, Side};

/// Rating reported for offence and defence before any game has been played.
pub const NEUTRAL_RATING: f64 = 50.0;

/// Points per game that map to the top of the 0–100 offence/defence scale.
pub const POINTS_SCALE: f64 = 40.0;

pub const DEFAULT_FORM_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum TeamResult {
    Win,
    Loss,
    Tie,
}
impl TeamResult {
    pub fn of(outcome: Outcome, side: Side) -> Self {
        match (outcome.winner(), side) {
            (None, _) => TeamResult::Tie,
            (Some(winner), side) if winner == side => TeamResult::Win,
            _ => TeamResult::Loss,
        }
    }

    /// Contribution to a win rate: a tie counts as half a win.
    pub fn win_share(&self) -> f64 {
        match self {
            TeamResult::Win => 1.0,
            TeamResult::Tie => 0.5,
            TeamResult::Loss => 0.0,
        }
    }
}

/// How team state is carried across a season boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SeasonTransition {
    /// Every team starts over at the initial rating.
    Reset,
    /// Elo is kept as-is; all counters and form are cleared.
    CarryForward,
    /// Elo moves `factor` of the way back to the initial rating; counters and form are cleared.
    Regress { factor: f64 },
}
impl SeasonTransition {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let SeasonTransition::Regress { factor } = self {
            if !(0.0..=1.0).contains(factor) {
                bail!("regression factor must be in the range 0..=1, got {factor}");
            }
        }
        Ok(())
    }
}

impl Default for SeasonTransition {
    fn default() -> Self {
        SeasonTransition::Regress { factor: 0.3 }
    }
}

/// Fixed-length window over the most recent results; the oldest result is dropped on overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct FormWindow {
    capacity: usize,
    results: VecDeque<TeamResult>,
}
impl FormWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            results: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: TeamResult) {
        if self.capacity == 0 {
            return;
        }
        if self.results.len() == self.capacity {
            self.results.pop_front();
        }
        self.results.push_back(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamResult> {
        self.results.iter()
    }

    pub fn win_rate(&self) -> f64 {
        let share: f64 = self.results.iter().map(TeamResult::win_share).sum();
        ratio(share, self.results.len() as f64)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamState {
    pub team_key: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub home_wins: u32,
    pub home_losses: u32,
    pub away_wins: u32,
    pub away_losses: u32,
    pub games_played: u32,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
    pub elo_rating: f64,
    pub last_n_results: FormWindow,
}
impl TeamState {
    pub fn new(team_key: impl Into<String>, initial_rating: f64, form_window: usize) -> Self {
        Self {
            team_key: team_key.into(),
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0,
            points_against: 0,
            home_wins: 0,
            home_losses: 0,
            away_wins: 0,
            away_losses: 0,
            games_played: 0,
            offensive_rating: NEUTRAL_RATING,
            defensive_rating: NEUTRAL_RATING,
            elo_rating: initial_rating,
            last_n_results: FormWindow::new(form_window),
        }
    }

    /// Accumulates the final score of a game this team took part in. Elo is not touched here.
    pub fn apply_result(&mut self, score: &FinalScore, side: Side) {
        let (scored, conceded) = match side {
            Side::Home => (score.home, score.away),
            Side::Away => (score.away, score.home),
        };
        let result = TeamResult::of(score.outcome(), side);
        match (result, side) {
            (TeamResult::Win, Side::Home) => {
                self.wins += 1;
                self.home_wins += 1;
            }
            (TeamResult::Win, Side::Away) => {
                self.wins += 1;
                self.away_wins += 1;
            }
            (TeamResult::Loss, Side::Home) => {
                self.losses += 1;
                self.home_losses += 1;
            }
            (TeamResult::Loss, Side::Away) => {
                self.losses += 1;
                self.away_losses += 1;
            }
            (TeamResult::Tie, _) => self.ties += 1,
        }
        self.points_for += scored as u32;
        self.points_against += conceded as u32;
        self.games_played += 1;
        self.last_n_results.push(result);
        self.recompute_ratings();
    }

    fn recompute_ratings(&mut self) {
        if self.games_played == 0 {
            self.offensive_rating = NEUTRAL_RATING;
            self.defensive_rating = NEUTRAL_RATING;
        } else {
            self.offensive_rating =
                (self.points_for_per_game() / POINTS_SCALE * 100.0).clamp(0.0, 100.0);
            self.defensive_rating =
                (100.0 - self.points_against_per_game() / POINTS_SCALE * 100.0).clamp(0.0, 100.0);
        }
    }

    pub fn reset_for_new_period(&mut self, transition: &SeasonTransition, initial_rating: f64) {
        self.elo_rating = match transition {
            SeasonTransition::Reset => initial_rating,
            SeasonTransition::CarryForward => self.elo_rating,
            SeasonTransition::Regress { factor } => {
                self.elo_rating * (1.0 - factor) + initial_rating * factor
            }
        };
        self.wins = 0;
        self.losses = 0;
        self.ties = 0;
        self.points_for = 0;
        self.points_against = 0;
        self.home_wins = 0;
        self.home_losses = 0;
        self.away_wins = 0;
        self.away_losses = 0;
        self.games_played = 0;
        self.last_n_results.clear();
        self.recompute_ratings();
    }

    pub fn points_for_per_game(&self) -> f64 {
        ratio(self.points_for as f64, self.games_played as f64)
    }

    pub fn points_against_per_game(&self) -> f64 {
        ratio(self.points_against as f64, self.games_played as f64)
    }

    /// Overall win rate, ties counting as half a win.
    pub fn win_rate(&self) -> f64 {
        ratio(
            self.wins as f64 + 0.5 * self.ties as f64,
            self.games_played as f64,
        )
    }

    pub fn home_win_rate(&self) -> f64 {
        let decided = self.home_wins + self.home_losses;
        ratio(self.home_wins as f64, decided as f64)
    }

    pub fn away_win_rate(&self) -> f64 {
        let decided = self.away_wins + self.away_losses;
        ratio(self.away_wins as f64, decided as f64)
    }

    /// Win rate over the form window, falling back to zero for an empty window.
    pub fn recent_win_rate(&self) -> f64 {
        self.last_n_results.win_rate()
    }
}

/// Quotient that treats a zero denominator as yielding zero.
#[inline]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Owns every [TeamState] of a single simulation run. Teams are kept in order of first appearance.
#[derive(Debug, Clone)]
pub struct TeamStore {
    initial_rating: f64,
    form_window: usize,
    index: FxHashMap<String, usize>,
    teams: Vec<TeamState>,
}
impl TeamStore {
    pub fn new(initial_rating: f64, form_window: usize) -> Self {
        Self {
            initial_rating,
            form_window,
            index: FxHashMap::default(),
            teams: vec![],
        }
    }

    pub fn initial_rating(&self) -> f64 {
        self.initial_rating
    }

    pub fn get_or_create(&mut self, team_key: &str) -> &mut TeamState {
        let ordinal = self.ordinal_of(team_key);
        &mut self.teams[ordinal]
    }

    fn ordinal_of(&mut self, team_key: &str) -> usize {
        if let Some(&ordinal) = self.index.get(team_key) {
            return ordinal;
        }
        let ordinal = self.teams.len();
        self.teams
            .push(TeamState::new(team_key, self.initial_rating, self.form_window));
        self.index.insert(team_key.to_string(), ordinal);
        ordinal
    }

    pub fn get(&self, team_key: &str) -> Option<&TeamState> {
        self.index.get(team_key).map(|&ordinal| &self.teams[ordinal])
    }

    /// Mutable access to two distinct teams at once, creating either if absent.
    ///
    /// # Panics
    /// If both keys name the same team.
    pub fn pair_mut(&mut self, first: &str, second: &str) -> (&mut TeamState, &mut TeamState) {
        assert_ne!(first, second, "a team cannot be paired with itself");
        let first = self.ordinal_of(first);
        let second = self.ordinal_of(second);
        if first < second {
            let (left, right) = self.teams.split_at_mut(second);
            (&mut left[first], &mut right[0])
        } else {
            let (left, right) = self.teams.split_at_mut(first);
            (&mut right[0], &mut left[second])
        }
    }

    /// Applies a season transition to every known team.
    pub fn reset_for_new_period(&mut self, transition: &SeasonTransition) {
        for team in &mut self.teams {
            team.reset_for_new_period(transition, self.initial_rating);
        }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamState> {
        self.teams.iter()
    }

    /// All teams by descending Elo rating, ties broken by team key.
    pub fn leaderboard(&self) -> Vec<TeamState> {
        let mut standings = self.teams.clone();
        standings.sort_by(|a, b| {
            b.elo_rating
                .total_cmp(&a.elo_rating)
                .then_with(|| a.team_key.cmp(&b.team_key))
        });
        standings
    }
}

#[cfg(test)]
mod tests;
