//! Core tuning logic.

use crate::cache::{TunedParams, TuningCache};
use crate::search::{run_search, CodeSizeCost, CostEvaluator};
use crate::space::{problem_sizes, ProblemSize, SearchSpace};
use crate::spec::SpecMap;
use annoforge_ir::fragment::CodeFragment;
use annoforge_ir::params::PerfParams;
use annoforge_ir::variant::{Variant, VariantSeq};
use anyhow::{anyhow, bail, Result};
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use tracing::info;

/// A `PerfTuning` region handed to a tuning strategy.
#[derive(Debug, Clone, Copy)]
pub struct TuningRequest<'a> {
    /// Raw annotation body of the region's leader.
    pub annotation: &'a str,
    /// Line on which the annotation body starts.
    pub line: usize,
    /// The region's children, not yet optimized.
    pub fragments: &'a [CodeFragment],
}

/// Optimizes fragments under a given parameter assignment.
///
/// Tuning strategies call back into the driver through this to generate
/// candidate code.
pub trait Reoptimizer {
    fn reoptimize(&self, fragments: &[CodeFragment], params: &PerfParams) -> Result<VariantSeq>;
}

pub trait TuningStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Return one or more tuned realizations of the region's children.
    fn tune(&self, request: &TuningRequest<'_>, driver: &dyn Reoptimizer) -> Result<VariantSeq>;
}

/// Tunes regions according to [`TuningSpec`](crate::spec::TuningSpec)s.
///
/// Every problem size of the spec is searched separately and yields one
/// variant, whose choices are the problem size's value indices.
pub struct SpecTuner {
    specs: SpecMap,
    evaluator: Arc<dyn CostEvaluator>,
    cache: Option<Mutex<TuningCache>>,
}

impl SpecTuner {
    pub fn new(specs: SpecMap) -> Self {
        Self {
            specs,
            evaluator: Arc::new(CodeSizeCost),
            cache: None,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn CostEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_cache(mut self, cache: TuningCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    pub fn specs(&self) -> &SpecMap {
        &self.specs
    }

    /// Copy of the attached cache, including results of past runs.
    pub fn cache_snapshot(&self) -> Result<Option<TuningCache>> {
        match &self.cache {
            Some(cache) => Ok(Some(lock(cache)?.clone())),
            None => Ok(None),
        }
    }

    fn cached(&self, fingerprint: &str, problem: &ProblemSize) -> Result<Option<TunedParams>> {
        match &self.cache {
            Some(cache) => Ok(lock(cache)?.get(fingerprint, problem).cloned()),
            None => Ok(None),
        }
    }

    fn remember(
        &self,
        fingerprint: &str,
        problem: &ProblemSize,
        tuned: &TunedParams,
    ) -> Result<()> {
        if let Some(cache) = &self.cache {
            lock(cache)?.insert(fingerprint, problem, tuned.clone());
        }
        Ok(())
    }
}

impl TuningStrategy for SpecTuner {
    fn name(&self) -> &str {
        "spec"
    }

    fn tune(&self, request: &TuningRequest<'_>, driver: &dyn Reoptimizer) -> Result<VariantSeq> {
        let (label, spec) = self.specs.extract(request.annotation, request.line)?;
        let problems = problem_sizes(&spec.input_params)?;
        let space = SearchSpace::from_axes(&spec.performance_params);
        let points = space.size()?;
        let fingerprint = spec.fingerprint()?;

        let mut variants = Vec::with_capacity(problems.len());
        for problem in &problems {
            info!(
                spec = %label,
                problem = %problem,
                points,
                evaluator = self.evaluator.name(),
                "begin empirical tuning for problem size"
            );

            let best = match self.cached(&fingerprint, problem)? {
                Some(hit) => {
                    info!(problem = %problem, "reusing cached tuning result");
                    hit
                }
                None => {
                    let outcome = run_search(&space, &spec.search, |params| {
                        let code = generate_single(driver, request.fragments, params)?;
                        self.evaluator.evaluate(&code, params, problem)
                    })?;
                    let tuned = TunedParams {
                        params: outcome.params,
                        cost: outcome.cost,
                    };
                    self.remember(&fingerprint, problem, &tuned)?;
                    tuned
                }
            };

            info!(
                problem = %problem,
                cost = best.cost,
                params = %format_params(&best.params),
                "obtained best performance parameters"
            );

            let code = generate_single(driver, request.fragments, &best.params)?;
            let header = tuning_header(best.cost, problem, &best.params);
            variants.push(Variant::new(header + &code, problem.indices.clone()));
        }

        Ok(VariantSeq::new(variants))
    }
}

fn generate_single(
    driver: &dyn Reoptimizer,
    fragments: &[CodeFragment],
    params: &PerfParams,
) -> Result<String> {
    let seq = driver.reoptimize(fragments, params)?;
    match seq.into_single() {
        Some(variant) => Ok(variant.code),
        None => bail!("the empirically optimized code cannot contain multiple versions"),
    }
}

fn lock(cache: &Mutex<TuningCache>) -> Result<std::sync::MutexGuard<'_, TuningCache>> {
    cache.lock().map_err(|_| anyhow!("tuning cache lock poisoned"))
}

fn format_params(params: &PerfParams) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comment block recording how a tuned variant was obtained.
pub fn tuning_header(cost: f64, problem: &ProblemSize, params: &PerfParams) -> String {
    let mut text = String::from("\n\n/**-- (Generated by annoforge)\n");
    let _ = writeln!(text, "Best performance cost:\n  {:.6}", cost);
    text.push_str("Tuned for specific problem sizes:\n");
    for (name, value) in problem.sorted_values() {
        let _ = writeln!(text, "  {} = {}", name, value);
    }
    text.push_str("Best performance parameters:\n");
    for (name, value) in params {
        let _ = writeln!(text, "  {} = {}", name, value);
    }
    text.push_str("--**/\n\n");
    text
}
