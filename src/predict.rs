//! Combines component scores into a home-win probability and a confidence label.

use anyhow::bail;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::component::ComponentScores;
use crate::game::Side;
use crate::weights::WeightVector;

/// Maps a weighted total onto a probability in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbabilityTransform {
    /// `1 / (1 + e^(−total / scale))`.
    Logistic { scale: f64 },
    /// `(total + half_span) / (2 · half_span)`, clamped to `[0, 1]`.
    Linear { half_span: f64 },
}
impl ProbabilityTransform {
    pub fn apply(&self, total: f64) -> f64 {
        match self {
            ProbabilityTransform::Logistic { scale } => 1.0 / (1.0 + (-total / scale).exp()),
            ProbabilityTransform::Linear { half_span } => {
                ((total + half_span) / (2.0 * half_span)).clamp(0.0, 1.0)
            }
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self {
            ProbabilityTransform::Logistic { scale } => {
                if !(scale.is_finite() && *scale > 0.0) {
                    bail!("logistic scale must be positive");
                }
            }
            ProbabilityTransform::Linear { half_span } => {
                if !(half_span.is_finite() && *half_span > 0.0) {
                    bail!("linear half-span must be positive");
                }
            }
        }
        Ok(())
    }
}

impl Default for ProbabilityTransform {
    fn default() -> Self {
        ProbabilityTransform::Logistic { scale: 15.0 }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Ordinal,
    EnumCount,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[strum(serialize = "low")]
    Low,
    #[strum(serialize = "medium")]
    Medium,
    #[strum(serialize = "high")]
    High,
}

/// Lower bounds on `|p − 0.5|` for the medium and high buckets. Anything below `medium` is low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub medium: f64,
    pub high: f64,
}
impl ConfidenceThresholds {
    pub fn classify(&self, probability: f64) -> Confidence {
        let distance = (probability - 0.5).abs();
        if distance >= self.high {
            Confidence::High
        } else if distance >= self.medium {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(0.0..=0.5).contains(&self.medium) || !(0.0..=0.5).contains(&self.high) {
            bail!("confidence thresholds must lie in the range 0..=0.5");
        }
        if self.medium > self.high {
            bail!("medium confidence threshold cannot exceed the high threshold");
        }
        Ok(())
    }
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            medium: 0.08,
            high: 0.15,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinerConfig {
    pub transform: ProbabilityTransform,
    pub thresholds: ConfidenceThresholds,
}
impl CombinerConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.transform.validate()?;
        self.thresholds.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combined {
    pub total: f64,
    pub home_win_probability: f64,
    pub confidence: Confidence,
    pub predicted_winner: Side,
}

/// Weighted total, probability, confidence and pick for one set of component scores.
pub fn combine(
    config: &CombinerConfig,
    weights: &WeightVector,
    scores: &ComponentScores,
) -> Combined {
    let total = weights.combine(scores);
    let home_win_probability = config.transform.apply(total);
    let confidence = config.thresholds.classify(home_win_probability);
    let predicted_winner = if home_win_probability > 0.5 {
        Side::Home
    } else {
        Side::Away
    };
    Combined {
        total,
        home_win_probability,
        confidence,
        predicted_winner,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub game_id: u64,
    pub season: u16,
    pub week: u8,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: Side,
    pub home_win_probability: f64,
    pub confidence: Confidence,
    pub total: f64,
    pub scores: ComponentScores,
    pub weights: WeightVector,
}
impl Prediction {
    pub fn predicted_team(&self) -> &str {
        match self.predicted_winner {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Probability assigned to the predicted winner.
    pub fn pick_probability(&self) -> f64 {
        match self.predicted_winner {
            Side::Home => self.home_win_probability,
            Side::Away => 1.0 - self.home_win_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::component::Component;

    #[test]
    fn logistic_transform() {
        let transform = ProbabilityTransform::default();
        assert_eq!(0.5, transform.apply(0.0));
        assert_float_absolute_eq!(1.0 / (1.0 + (-1.0f64).exp()), transform.apply(15.0));
        assert_float_absolute_eq!(1.0, transform.apply(15.0) + transform.apply(-15.0));
    }

    #[test]
    fn linear_transform() {
        let transform = ProbabilityTransform::Linear { half_span: 100.0 };
        assert_eq!(0.5, transform.apply(0.0));
        assert_float_absolute_eq!(0.75, transform.apply(50.0));
        assert_eq!(1.0, transform.apply(150.0));
        assert_eq!(0.0, transform.apply(-150.0));
    }

    #[test]
    fn confidence_buckets() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(Confidence::Low, thresholds.classify(0.5));
        assert_eq!(Confidence::Low, thresholds.classify(0.579));
        assert_eq!(Confidence::Medium, thresholds.classify(0.59));
        assert_eq!(Confidence::Medium, thresholds.classify(0.36));
        assert_eq!(Confidence::High, thresholds.classify(0.65));
        assert_eq!(Confidence::High, thresholds.classify(0.0));
        assert_eq!(Confidence::High, thresholds.classify(1.0));
    }

    #[test]
    fn confidence_partition_is_complete() {
        let thresholds = ConfidenceThresholds::default();
        const STEPS: u32 = 100_000;
        for step in 0..=STEPS {
            let probability = step as f64 / STEPS as f64;
            let distance = (probability - 0.5).abs();
            let matching: Vec<_> = Confidence::iter()
                .filter(|bucket| match bucket {
                    Confidence::Low => distance < thresholds.medium,
                    Confidence::Medium => {
                        distance >= thresholds.medium && distance < thresholds.high
                    }
                    Confidence::High => distance >= thresholds.high,
                })
                .collect();
            assert_eq!(1, matching.len(), "p={probability}: {matching:?}");
            assert_eq!(matching[0], thresholds.classify(probability));
        }
    }

    #[test]
    fn thresholds_validation() {
        assert!(ConfidenceThresholds::default().validate().is_ok());
        assert_eq!(
            "medium confidence threshold cannot exceed the high threshold",
            ConfidenceThresholds { medium: 0.2, high: 0.1 }
                .validate()
                .err()
                .unwrap()
                .to_string()
        );
        assert!(ConfidenceThresholds { medium: 0.1, high: 0.6 }.validate().is_err());
        assert!(ProbabilityTransform::Logistic { scale: 0.0 }.validate().is_err());
    }

    #[test]
    fn pick_probability_follows_the_pick() {
        let mut prediction = Prediction {
            game_id: 1,
            season: 2023,
            week: 1,
            home_team: "KC".into(),
            away_team: "DET".into(),
            predicted_winner: Side::Home,
            home_win_probability: 0.7,
            confidence: Confidence::High,
            total: 12.7,
            scores: ComponentScores::default(),
            weights: WeightVector::default(),
        };
        assert_eq!("KC", prediction.predicted_team());
        assert_eq!(0.7, prediction.pick_probability());

        prediction.predicted_winner = Side::Away;
        prediction.home_win_probability = 0.25;
        assert_eq!("DET", prediction.predicted_team());
        assert_eq!(0.75, prediction.pick_probability());
    }

    #[test]
    fn combine_picks_home_only_above_half() {
        let config = CombinerConfig::default();
        let weights = WeightVector::default();
        let even = combine(&config, &weights, &ComponentScores::default());
        assert_eq!(0.5, even.home_win_probability);
        assert_eq!(Side::Away, even.predicted_winner);
        assert_eq!(Confidence::Low, even.confidence);

        let mut scores = ComponentScores::default();
        scores[Component::Elo] = 40.0;
        let favoured = combine(&config, &weights, &scores);
        assert_float_absolute_eq!(12.0, favoured.total);
        assert_float_absolute_eq!(1.0 / (1.0 + (-0.8f64).exp()), favoured.home_win_probability);
        assert_eq!(Side::Home, favoured.predicted_winner);
        assert_eq!(Confidence::High, favoured.confidence);
    }

    #[test]
    fn confidence_names() {
        assert_eq!("medium", Confidence::Medium.to_string());
        assert!(Confidence::High > Confidence::Low);
    }
}
