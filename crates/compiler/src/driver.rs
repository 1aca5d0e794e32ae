//! The fragment optimization driver.

use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};
use crate::validate::check_perf_tuning_annotations;
use annoforge_autotune::tuner::{Reoptimizer, TuningRequest, TuningStrategy};
use annoforge_ir::fragment::{AnnotatedRegion, CodeFragment};
use annoforge_ir::params::PerfParams;
use annoforge_ir::variant::{Variant, VariantSeq};
use annoforge_transforms::registry::TransformRegistry;
use annoforge_transforms::transform::TransformInputs;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Applies the optimizations described by annotations to a fragment tree.
///
/// `PerfTuning` regions go to the tuning strategy; every other region is
/// rewritten by the transformation registered under its kind. Sibling
/// results combine as a Cartesian product, so the number of produced
/// variants is the product of each fragment's variant count.
pub struct OptDriver {
    config: DriverConfig,
    registry: TransformRegistry,
    tuner: Arc<dyn TuningStrategy>,
}

impl OptDriver {
    pub fn new(
        config: DriverConfig,
        registry: TransformRegistry,
        tuner: Arc<dyn TuningStrategy>,
    ) -> Self {
        Self {
            config,
            registry,
            tuner,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Validate and optimize a top-level fragment sequence.
    pub fn optimize(
        &self,
        fragments: &[CodeFragment],
        params: &PerfParams,
    ) -> DriverResult<VariantSeq> {
        self.optimize_fragments(fragments, params, true)
    }

    /// Optimize every fragment and combine the results in order.
    ///
    /// Tuning-annotation placement is only checked when `is_top_level` is
    /// set. An empty sequence yields a single empty variant.
    pub fn optimize_fragments(
        &self,
        fragments: &[CodeFragment],
        params: &PerfParams,
        is_top_level: bool,
    ) -> DriverResult<VariantSeq> {
        if is_top_level {
            check_perf_tuning_annotations(fragments)?;
        }

        let sequences: Vec<VariantSeq> = if self.config.parallel_siblings && fragments.len() > 1 {
            fragments
                .par_iter()
                .map(|fragment| self.optimize_fragment(fragment, params))
                .collect::<DriverResult<_>>()?
        } else {
            fragments
                .iter()
                .map(|fragment| self.optimize_fragment(fragment, params))
                .collect::<DriverResult<_>>()?
        };

        let mut combined: Option<VariantSeq> = None;
        for seq in sequences {
            combined = Some(match combined {
                None => seq,
                Some(acc) => acc.product(&seq),
            });
        }
        Ok(combined.unwrap_or_else(VariantSeq::unit))
    }

    fn optimize_fragment(
        &self,
        fragment: &CodeFragment,
        params: &PerfParams,
    ) -> DriverResult<VariantSeq> {
        match fragment {
            CodeFragment::Plain(plain) => {
                Ok(VariantSeq::single(Variant::plain(plain.code.clone())))
            }
            CodeFragment::Region(region) => {
                let seq = if region.is_perf_tuning() {
                    self.tune_region(region)?
                } else {
                    self.transform_region(region, params)?
                };
                Ok(seq.wrap(&region.leader.text, &region.trailer.text))
            }
        }
    }

    fn tune_region(&self, region: &AnnotatedRegion) -> DriverResult<VariantSeq> {
        let leader = &region.leader;
        let request = TuningRequest {
            annotation: &leader.body,
            line: leader.body_line,
            fragments: &region.children,
        };

        debug!(
            line = leader.kind_line,
            strategy = self.tuner.name(),
            "starting empirical performance tuning"
        );
        let seq = self
            .tuner
            .tune(&request, self)
            .map_err(|source| DriverError::Tuning {
                line: leader.kind_line,
                source,
            })?;

        if seq.is_empty() {
            return Err(DriverError::EmptyVariants {
                kind: leader.kind.clone(),
                line: leader.kind_line,
            });
        }
        Ok(seq)
    }

    fn transform_region(
        &self,
        region: &AnnotatedRegion,
        params: &PerfParams,
    ) -> DriverResult<VariantSeq> {
        let leader = &region.leader;

        let body = self
            .optimize_fragments(&region.children, params, false)?
            .into_single()
            .ok_or_else(|| DriverError::MultipleVersions {
                kind: leader.kind.clone(),
                line: leader.kind_line,
            })?;

        let factory = self
            .registry
            .resolve(&leader.kind)
            .map_err(|_| DriverError::UnknownTransformation {
                kind: leader.kind.clone(),
                line: leader.kind_line,
            })?;
        debug!(kind = %leader.kind, line = leader.kind_line, "resolved transformation");

        let inputs = TransformInputs {
            params,
            annotation: &leader.body,
            body: &body.code,
            line: leader.body_line,
            indent: leader.indent,
            language: self.config.language,
        };
        let code = factory
            .create(inputs)
            .and_then(|transformation| transformation.transform())
            .map_err(|source| DriverError::Transformation {
                kind: leader.kind.clone(),
                line: leader.kind_line,
                source,
            })?;

        Ok(VariantSeq::single(Variant::plain(code)))
    }
}

impl Reoptimizer for OptDriver {
    fn reoptimize(
        &self,
        fragments: &[CodeFragment],
        params: &PerfParams,
    ) -> anyhow::Result<VariantSeq> {
        Ok(self.optimize_fragments(fragments, params, false)?)
    }
}
