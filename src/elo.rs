//! Margin-of-victory Elo updates.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::game::FinalScore;
use crate::team::TeamState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    pub k_factor: f64,
    pub initial_rating: f64,
    /// Rating difference at which the stronger side is a 10:1 favourite.
    pub divisor: f64,
}
impl EloConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.k_factor.is_finite() && self.k_factor > 0.0) {
            bail!("K-factor must be positive");
        }
        if !self.initial_rating.is_finite() {
            bail!("initial rating must be finite");
        }
        if !(self.divisor.is_finite() && self.divisor > 0.0) {
            bail!("rating divisor must be positive");
        }
        Ok(())
    }
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            initial_rating: 1500.0,
            divisor: 400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloUpdate {
    pub expected_home: f64,
    pub expected_away: f64,
    pub margin_multiplier: f64,
    pub delta_home: f64,
    pub delta_away: f64,
}

/// Probability of the home side winning, given the two ratings.
#[inline]
pub fn expected_home(elo_home: f64, elo_away: f64, divisor: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((elo_away - elo_home) / divisor))
}

#[inline]
pub fn margin_multiplier(margin: u16) -> f64 {
    (u16::max(margin, 1) as f64 + 1.0).ln()
}

/// Computes the rating change implied by `score` without applying it.
pub fn compute(config: &EloConfig, elo_home: f64, elo_away: f64, score: &FinalScore) -> EloUpdate {
    let expected_home = expected_home(elo_home, elo_away, config.divisor);
    let actual_home = score.outcome().home_points();
    let margin_multiplier = margin_multiplier(score.margin());
    let delta_home = config.k_factor * margin_multiplier * (actual_home - expected_home);
    EloUpdate {
        expected_home,
        expected_away: 1.0 - expected_home,
        margin_multiplier,
        delta_home,
        // negating rather than recomputing from the away side keeps the exchange exactly zero-sum
        delta_away: -delta_home,
    }
}

/// Computes and applies the rating change to both teams.
pub fn update(
    config: &EloConfig,
    home: &mut TeamState,
    away: &mut TeamState,
    score: &FinalScore,
) -> EloUpdate {
    let update = compute(config, home.elo_rating, away.elo_rating, score);
    home.elo_rating += update.delta_home;
    away.elo_rating += update.delta_away;
    update
}
