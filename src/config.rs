//! Engine configuration: everything a simulation run needs other than the games themselves.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::component::ScoringConfig;
use crate::elo::EloConfig;
use crate::predict::CombinerConfig;
use crate::team::{SeasonTransition, DEFAULT_FORM_WINDOW};
use crate::weights::WeightVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: WeightVector,
    pub scoring: ScoringConfig,
    pub combiner: CombinerConfig,
    pub elo: EloConfig,
    pub transition: SeasonTransition,
    pub form_window: usize,
}
impl EngineConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.scoring.validate()?;
        self.combiner.validate()?;
        self.elo.validate()?;
        self.transition.validate()?;
        if self.form_window == 0 {
            bail!("form window must hold at least one result");
        }
        Ok(())
    }

    pub fn with_weights(self, weights: WeightVector) -> Self {
        Self { weights, ..self }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: WeightVector::default(),
            scoring: ScoringConfig::default(),
            combiner: CombinerConfig::default(),
            elo: EloConfig::default(),
            transition: SeasonTransition::default(),
            form_window: DEFAULT_FORM_WINDOW,
        }
    }
}
