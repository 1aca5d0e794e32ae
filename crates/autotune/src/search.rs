//! Search over the performance-parameter space.

use crate::space::{ProblemSize, SearchSpace};
use crate::spec::{SearchAlgorithm, SearchConfig};
use annoforge_ir::params::PerfParams;
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Assigns a cost to a generated code candidate; lower is better.
pub trait CostEvaluator: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, code: &str, params: &PerfParams, problem: &ProblemSize) -> Result<f64>;
}

/// Scores candidates by generated code size in bytes.
///
/// Stands in for a compile-and-time evaluator when no benchmarking
/// harness is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeSizeCost;

impl CostEvaluator for CodeSizeCost {
    fn name(&self) -> &str {
        "code-size"
    }

    fn evaluate(&self, code: &str, _params: &PerfParams, _problem: &ProblemSize) -> Result<f64> {
        Ok(code.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub params: PerfParams,
    pub cost: f64,
    pub evaluated: usize,
}

/// Spaces up to this size are shuffled in full by the random search;
/// larger ones are sampled.
const SHUFFLE_LIMIT: usize = 1 << 20;

/// Visit the search space in the configured order and keep the cheapest
/// point. Ties keep the earliest visited point.
///
/// At most `total_runs` points are generated, so the space is never
/// enumerated up front.
pub fn run_search<F>(
    space: &SearchSpace,
    config: &SearchConfig,
    mut cost_of: F,
) -> Result<SearchOutcome>
where
    F: FnMut(&PerfParams) -> Result<f64>,
{
    let size = space.size()?;
    if size == 0 {
        bail!("the performance parameter search space is empty");
    }
    let budget = config.total_runs.unwrap_or(usize::MAX).clamp(1, size);
    let limit = time_limit(config);
    let start = Instant::now();

    let mut best: Option<(PerfParams, f64)> = None;
    let mut evaluated = 0usize;

    for index in visit_order(size, budget, config) {
        if let Some(limit) = limit {
            if evaluated > 0 && start.elapsed() >= limit {
                debug!(evaluated, "search time limit reached");
                break;
            }
        }

        let coordinate = space.coordinate_at(index);
        let params = space.params_at(&coordinate);
        let cost = cost_of(&params)?;
        evaluated += 1;

        if !cost.is_finite() {
            warn!(?coordinate, cost, "discarding search point with non-finite cost");
            continue;
        }

        match &best {
            Some((_, best_cost)) if cost >= *best_cost => {}
            _ => best = Some((params, cost)),
        }
    }

    let (params, cost) = match best {
        Some(best) => best,
        None => bail!("no search point produced a finite cost"),
    };
    Ok(SearchOutcome {
        params,
        cost,
        evaluated,
    })
}

fn time_limit(config: &SearchConfig) -> Option<Duration> {
    let minutes = config.time_limit_minutes.filter(|minutes| *minutes > 0.0)?;
    match Duration::try_from_secs_f64(minutes * 60.0) {
        Ok(limit) => Some(limit),
        Err(_) => {
            warn!(minutes, "time limit is out of range; searching without one");
            None
        }
    }
}

/// Indices of the points to visit, `budget` of them at most.
fn visit_order(
    size: usize,
    budget: usize,
    config: &SearchConfig,
) -> Box<dyn Iterator<Item = usize>> {
    if config.algorithm == SearchAlgorithm::Exhaustive {
        return Box::new(0..budget);
    }

    let mut rng = fastrand::Rng::with_seed(config.seed);
    if size <= SHUFFLE_LIMIT {
        let mut indices: Vec<usize> = (0..size).collect();
        rng.shuffle(&mut indices);
        indices.truncate(budget);
        return Box::new(indices.into_iter());
    }

    let mut seen = HashSet::new();
    let sampled = std::iter::from_fn(move || loop {
        let index = rng.usize(..size);
        if seen.insert(index) {
            return Some(index);
        }
    });
    Box::new(sampled.take(budget))
}
