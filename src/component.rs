//! The five matchup sub-scores. Each is a pure function of the two pre-game [TeamState]s, clamped
//! to a configured symmetric range. Positive values favour the home side.

use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use anyhow::bail;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::team::TeamState;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Ordinal,
    EnumCount,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
)]
pub enum Component {
    #[strum(serialize = "elo")]
    #[serde(rename = "elo")]
    Elo,
    #[strum(serialize = "power")]
    #[serde(rename = "power")]
    Power,
    #[strum(serialize = "situational")]
    #[serde(rename = "situational")]
    Situational,
    #[strum(serialize = "matchup")]
    #[serde(rename = "matchup")]
    Matchup,
    #[strum(serialize = "recentForm")]
    #[serde(rename = "recentForm")]
    RecentForm,
}

impl From<Component> for usize {
    fn from(component: Component) -> Self {
        component.ordinal()
    }
}

/// One value per [Component], indexable by component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComponentScores([f64; Component::COUNT]);
impl ComponentScores {
    pub fn new(values: [f64; Component::COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; Component::COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, f64)> + '_ {
        Component::iter().map(|component| (component, self[component]))
    }
}

impl Index<Component> for ComponentScores {
    type Output = f64;

    fn index(&self, component: Component) -> &Self::Output {
        &self.0[component.ordinal()]
    }
}

impl IndexMut<Component> for ComponentScores {
    fn index_mut(&mut self, component: Component) -> &mut Self::Output {
        &mut self.0[component.ordinal()]
    }
}

impl Display for ComponentScores {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, (component, value)) in self.iter().enumerate() {
            if index != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component}: {value:.3}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Elo points per unit of Elo score.
    pub elo_divisor: f64,
    /// Additive constant applied to the situational score in the home team's favour.
    pub home_advantage: f64,
    /// Scale applied to a difference in win rates.
    pub win_rate_scale: f64,
    /// Half-width of the clamp range, per component.
    pub limits: ComponentLimits,
}
impl ScoringConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.elo_divisor.is_finite() && self.elo_divisor > 0.0) {
            bail!("Elo divisor must be positive");
        }
        if !self.home_advantage.is_finite() {
            bail!("home advantage must be finite");
        }
        if !(self.win_rate_scale.is_finite() && self.win_rate_scale > 0.0) {
            bail!("win rate scale must be positive");
        }
        self.limits.validate()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            elo_divisor: 20.0,
            home_advantage: 3.0,
            win_rate_scale: 50.0,
            limits: ComponentLimits::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLimits {
    pub elo: f64,
    pub power: f64,
    pub situational: f64,
    pub matchup: f64,
    pub recent_form: f64,
}
impl ComponentLimits {
    pub fn of(&self, component: Component) -> f64 {
        match component {
            Component::Elo => self.elo,
            Component::Power => self.power,
            Component::Situational => self.situational,
            Component::Matchup => self.matchup,
            Component::RecentForm => self.recent_form,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for component in Component::iter() {
            let limit = self.of(component);
            if !(limit.is_finite() && limit > 0.0) {
                bail!("{component} limit must be positive, got {limit}");
            }
        }
        Ok(())
    }
}

impl Default for ComponentLimits {
    fn default() -> Self {
        Self {
            elo: 50.0,
            power: 50.0,
            situational: 25.0,
            matchup: 20.0,
            recent_form: 50.0,
        }
    }
}

#[inline]
fn clamp(value: f64, limit: f64) -> f64 {
    value.clamp(-limit, limit)
}

pub fn elo(config: &ScoringConfig, home: &TeamState, away: &TeamState) -> f64 {
    clamp(
        (home.elo_rating - away.elo_rating) / config.elo_divisor,
        config.limits.elo,
    )
}

/// Each side's offence against the other's defensive weakness, on the 0–100 rating scale.
pub fn power(config: &ScoringConfig, home: &TeamState, away: &TeamState) -> f64 {
    let home_power = (home.offensive_rating + (100.0 - away.defensive_rating)) / 2.0;
    let away_power = (away.offensive_rating + (100.0 - home.defensive_rating)) / 2.0;
    clamp((home_power - away_power) / 100.0 * 50.0, config.limits.power)
}

/// Home record at home against away record on the road, plus a fixed home-field bonus.
pub fn situational(config: &ScoringConfig, home: &TeamState, away: &TeamState) -> f64 {
    let edge = home.home_win_rate() - away.away_win_rate();
    clamp(
        edge * config.win_rate_scale + config.home_advantage,
        config.limits.situational,
    )
}

/// Projected margin: each side's scoring averaged with what the opponent concedes.
pub fn matchup(config: &ScoringConfig, home: &TeamState, away: &TeamState) -> f64 {
    let home_projected = (home.points_for_per_game() + away.points_against_per_game()) / 2.0;
    let away_projected = (away.points_for_per_game() + home.points_against_per_game()) / 2.0;
    clamp(home_projected - away_projected, config.limits.matchup)
}

pub fn recent_form(config: &ScoringConfig, home: &TeamState, away: &TeamState) -> f64 {
    let edge = home.recent_win_rate() - away.recent_win_rate();
    clamp(edge * config.win_rate_scale, config.limits.recent_form)
}

/// Evaluates all five components for a matchup.
pub fn score(config: &ScoringConfig, home: &TeamState, away: &TeamState) -> ComponentScores {
    let mut scores = ComponentScores::default();
    for component in Component::iter() {
        scores[component] = match component {
            Component::Elo => elo(config, home, away),
            Component::Power => power(config, home, away),
            Component::Situational => situational(config, home, away),
            Component::Matchup => matchup(config, home, away),
            Component::RecentForm => recent_form(config, home, away),
        };
    }
    scores
}
