//! Weighting of the five components. A [WeightVector] can only be obtained through validation, so
//! holding one is proof that its components are non-negative and sum to one.

use std::fmt::{Display, Formatter};
use std::ops::Index;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use thiserror::Error;

use crate::component::{Component, ComponentScores};

/// Permitted deviation of the weight sum from one.
pub const SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight for {component} must be finite and non-negative, got {value}")]
    InvalidComponent { component: Component, value: f64 },

    #[error("weights must sum to 1 ± 0.01, got {sum}")]
    InvalidSum { sum: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightTable", into = "WeightTable")]
pub struct WeightVector([f64; Component::COUNT]);
impl WeightVector {
    pub fn new(values: [f64; Component::COUNT]) -> Result<Self, WeightError> {
        for component in Component::iter() {
            let value = values[component.ordinal()];
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::InvalidComponent { component, value });
            }
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(WeightError::InvalidSum { sum });
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64; Component::COUNT] {
        &self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Weighted sum of the component scores.
    pub fn combine(&self, scores: &ComponentScores) -> f64 {
        Component::iter()
            .map(|component| scores[component] * self[component])
            .sum()
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self([0.30, 0.25, 0.15, 0.15, 0.15])
    }
}

impl Index<Component> for WeightVector {
    type Output = f64;

    fn index(&self, component: Component) -> &Self::Output {
        &self.0[component.ordinal()]
    }
}

impl TryFrom<[f64; Component::COUNT]> for WeightVector {
    type Error = WeightError;

    fn try_from(values: [f64; Component::COUNT]) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl Display for WeightVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, component) in Component::iter().enumerate() {
            if index != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component}: {:.2}", self[component])?;
        }
        write!(f, "]")
    }
}

/// The external representation, keyed by component name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeightTable {
    pub elo: f64,
    pub power: f64,
    pub situational: f64,
    pub matchup: f64,
    pub recent_form: f64,
}

impl TryFrom<WeightTable> for WeightVector {
    type Error = WeightError;

    fn try_from(table: WeightTable) -> Result<Self, Self::Error> {
        Self::new([
            table.elo,
            table.power,
            table.situational,
            table.matchup,
            table.recent_form,
        ])
    }
}

impl From<WeightVector> for WeightTable {
    fn from(weights: WeightVector) -> Self {
        Self {
            elo: weights[Component::Elo],
            power: weights[Component::Power],
            situational: weights[Component::Situational],
            matchup: weights[Component::Matchup],
            recent_form: weights[Component::RecentForm],
        }
    }
}
