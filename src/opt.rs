//! Weight calibration by exhaustive search over a simplex lattice.

use std::cmp::Ordering;
use std::fmt::Display;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use strum::EnumCount;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::component::Component;
use crate::config::EngineConfig;
use crate::game::Schedule;
use crate::sim;
use crate::sim::Accuracy;
use crate::weights::WeightVector;

const STEP_EPSILON: f64 = 1e-9;

/// Default cap on the number of lattice points a search may evaluate.
pub const DEFAULT_MAX_CANDIDATES: usize = 1_000_000;

#[derive(Debug, Error, PartialEq)]
pub enum OptimisationError {
    #[error("lattice step must lie in the range (0, 1] and divide 1 evenly, got {0}")]
    InvalidStep(f64),

    #[error("a lattice of {divisions} divisions exceeds the limit of {limit} candidates")]
    LatticeTooLarge { divisions: u32, limit: usize },

    #[error("at least one leader must be retained")]
    NoLeaders,

    #[error("no completed games to evaluate against")]
    NoGames,

    #[error("all {0} candidates failed")]
    AllCandidatesFailed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexSearchConfig {
    /// Spacing between adjacent lattice points along each component.
    pub step: f64,
    /// Number of best candidates to report.
    pub top_k: usize,
    /// Largest lattice the search will agree to evaluate.
    pub max_candidates: usize,
}
impl SimplexSearchConfig {
    pub fn validate(&self) -> Result<(), OptimisationError> {
        checked_lattice_size(self.step, self.max_candidates)?;
        if self.top_k == 0 {
            return Err(OptimisationError::NoLeaders);
        }
        Ok(())
    }
}

impl Default for SimplexSearchConfig {
    fn default() -> Self {
        Self {
            step: 0.05,
            top_k: 10,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Number of lattice divisions implied by `step`, i.e. `1 / step` when that is a whole number.
pub fn divisions(step: f64) -> Result<u32, OptimisationError> {
    if !(step.is_finite() && step > 0.0 && step <= 1.0) {
        return Err(OptimisationError::InvalidStep(step));
    }
    let inverse = 1.0 / step;
    let rounded = inverse.round();
    if (inverse - rounded).abs() > STEP_EPSILON * inverse || rounded > u32::MAX as f64 {
        return Err(OptimisationError::InvalidStep(step));
    }
    Ok(rounded as u32)
}

/// Number of points on a lattice of `divisions` over the five-component simplex: `C(n + 4, 4)`,
/// or `None` if that does not fit in a `usize`.
pub fn lattice_size(divisions: u32) -> Option<usize> {
    let n = usize::try_from(divisions).ok()?;
    let k = Component::COUNT - 1;
    (1..=k).try_fold(1usize, |acc, i| Some(acc.checked_mul(n.checked_add(i)?)? / i))
}

/// Number of lattice points for `step`, provided it is at most `max_candidates`.
pub fn checked_lattice_size(step: f64, max_candidates: usize) -> Result<usize, OptimisationError> {
    let divisions = divisions(step)?;
    lattice_size(divisions)
        .filter(|&size| size <= max_candidates)
        .ok_or(OptimisationError::LatticeTooLarge {
            divisions,
            limit: max_candidates,
        })
}

/// Every weight vector whose components are non-negative multiples of `step` summing to one, in
/// lexicographic order of the component counts. Fails rather than allocate more than
/// `max_candidates` points.
pub fn simplex_lattice(
    step: f64,
    max_candidates: usize,
) -> Result<Vec<WeightVector>, OptimisationError> {
    let size = checked_lattice_size(step, max_candidates)?;
    let divisions = divisions(step)?;
    let mut lattice = Vec::with_capacity(size);
    let mut counts = [0u32; Component::COUNT];
    fill(&mut counts, 0, divisions, divisions, &mut lattice);
    Ok(lattice)
}

fn fill(
    counts: &mut [u32; Component::COUNT],
    position: usize,
    remaining: u32,
    divisions: u32,
    lattice: &mut Vec<WeightVector>,
) {
    if position == Component::COUNT - 1 {
        counts[position] = remaining;
        let values = counts.map(|count| count as f64 / divisions as f64);
        // the counts sum to `divisions` exactly, so the weights always validate
        if let Ok(weights) = WeightVector::new(values) {
            lattice.push(weights);
        }
        return;
    }
    for count in 0..=remaining {
        counts[position] = count;
        fill(counts, position + 1, remaining - count, divisions, lattice);
    }
}

/// How well a weight vector did over the historical games.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub brier_score: f64,
    pub decided: u32,
}

impl From<&Accuracy> for Evaluation {
    fn from(accuracy: &Accuracy) -> Self {
        Self {
            accuracy: accuracy.accuracy(),
            brier_score: accuracy.brier_score(),
            decided: accuracy.overall.decided(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Position of the weight vector in the lattice.
    pub ordinal: usize,
    pub weights: WeightVector,
    pub evaluation: Evaluation,
}
impl Candidate {
    /// Higher accuracy first, then lower Brier score, then lattice order.
    pub fn rank(&self, other: &Candidate) -> Ordering {
        other
            .evaluation
            .accuracy
            .total_cmp(&self.evaluation.accuracy)
            .then_with(|| self.evaluation.brier_score.total_cmp(&other.evaluation.brier_score))
            .then_with(|| self.ordinal.cmp(&other.ordinal))
    }
}

#[derive(Debug)]
pub struct SimplexSearchOutcome {
    pub best: Candidate,
    /// The best `top_k` candidates, best first.
    pub leaders: Vec<Candidate>,
    pub evaluated: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Evaluates every point of the lattice in parallel. A candidate whose evaluation fails is logged
/// and counted, and the search carries on with the rest.
pub fn simplex_search<E: Display>(
    config: &SimplexSearchConfig,
    evaluate_f: impl Fn(&WeightVector) -> Result<Evaluation, E> + Sync,
) -> Result<SimplexSearchOutcome, OptimisationError> {
    config.validate()?;
    let start_time = Instant::now();
    let lattice = simplex_lattice(config.step, config.max_candidates)?;
    info!(
        "evaluating {} candidates at step {}",
        lattice.len(),
        config.step
    );

    let results: Vec<_> = lattice
        .par_iter()
        .enumerate()
        .map(|(ordinal, weights)| {
            evaluate_f(weights)
                .map(|evaluation| Candidate {
                    ordinal,
                    weights: *weights,
                    evaluation,
                })
                .map_err(|err| (ordinal, err.to_string()))
        })
        .collect();

    let evaluated = results.len();
    let mut failed = 0;
    let mut candidates = Vec::with_capacity(evaluated);
    for result in results {
        match result {
            Ok(candidate) => candidates.push(candidate),
            Err((ordinal, err)) => {
                warn!("candidate {} ({}) failed: {err}", ordinal, lattice[ordinal]);
                failed += 1;
            }
        }
    }
    if candidates.is_empty() {
        return Err(OptimisationError::AllCandidatesFailed(evaluated));
    }

    candidates.sort_by(Candidate::rank);
    candidates.truncate(config.top_k);
    let best = candidates[0].clone();
    let elapsed = start_time.elapsed();
    info!(
        "best of {evaluated}: {} with accuracy {:.4}, Brier {:.4} ({failed} failed, {:.3}s)",
        best.weights,
        best.evaluation.accuracy,
        best.evaluation.brier_score,
        elapsed.as_millis() as f64 / 1_000.
    );
    Ok(SimplexSearchOutcome {
        best,
        leaders: candidates,
        evaluated,
        failed,
        elapsed,
    })
}

/// Finds the weight vector that maximises backtest accuracy over `schedule`, holding every other
/// part of `base` fixed. Each candidate replays the schedule on its own simulator.
pub fn optimise_weights(
    base: &EngineConfig,
    schedule: &Schedule,
    config: &SimplexSearchConfig,
) -> Result<SimplexSearchOutcome, anyhow::Error> {
    base.validate()?;
    config.validate()?;
    if schedule.completed().next().is_none() {
        return Err(OptimisationError::NoGames.into());
    }
    debug!("optimising weights over {} games", schedule.len());
    let outcome = simplex_search(config, |weights| {
        let backtest = sim::backtest(base.clone().with_weights(*weights), schedule)?;
        Ok::<_, anyhow::Error>(Evaluation::from(&backtest.accuracy))
    })?;
    Ok(outcome)
}
