use annoforge_autotune::search::CostEvaluator;
use annoforge_autotune::space::ProblemSize;
use annoforge_autotune::spec::{ParamAxis, SpecMap, TuningSpec};
use annoforge_autotune::tuner::{Reoptimizer, SpecTuner, TuningRequest, TuningStrategy};
use annoforge_compiler::{DriverConfig, DriverError, OptDriver};
use annoforge_ir::builder::{leader, trailer, FragmentBuilder};
use annoforge_ir::fragment::{CodeFragment, TrailerAnnotation, PERF_TUNING_KIND};
use annoforge_ir::params::{ParamValue, PerfParams};
use annoforge_ir::variant::{Variant, VariantSeq};
use annoforge_transforms::registry::TransformRegistry;
use annoforge_transforms::transform::{TransformFactory, TransformInputs, Transformation};
use anyhow::{bail, Result};
use std::sync::Arc;

struct CandidateTuner(Vec<Variant>);

impl TuningStrategy for CandidateTuner {
    fn name(&self) -> &str {
        "candidates"
    }

    fn tune(&self, _request: &TuningRequest<'_>, _driver: &dyn Reoptimizer) -> Result<VariantSeq> {
        Ok(VariantSeq::new(self.0.clone()))
    }
}

struct Broken;

struct BrokenRun;

impl Transformation for BrokenRun {
    fn transform(&self) -> Result<String> {
        bail!("loop bounds are not affine")
    }
}

impl TransformFactory for Broken {
    fn name(&self) -> &str {
        "Broken"
    }

    fn create<'a>(&self, _inputs: TransformInputs<'a>) -> Result<Box<dyn Transformation + 'a>> {
        Ok(Box::new(BrokenRun))
    }
}

/// Prefers the unroll factor closest to a target.
struct PreferUnroll(i64);

impl CostEvaluator for PreferUnroll {
    fn name(&self) -> &str {
        "prefer-unroll"
    }

    fn evaluate(&self, _code: &str, params: &PerfParams, _problem: &ProblemSize) -> Result<f64> {
        let uf = params["UF"].as_int().unwrap_or(0);
        Ok((uf - self.0).abs() as f64)
    }
}

fn candidate_driver() -> OptDriver {
    let tuner = Arc::new(CandidateTuner(vec![
        Variant::new("x", vec![0]),
        Variant::new("y", vec![1]),
    ]));
    OptDriver::new(
        DriverConfig::default(),
        TransformRegistry::with_default_transforms(),
        tuner,
    )
}

fn tuning_region(line: usize, children: Vec<CodeFragment>) -> CodeFragment {
    CodeFragment::region(
        leader(PERF_TUNING_KIND, "import spec unroll;", line).with_text("L"),
        children,
        TrailerAnnotation::new("T", line + 10),
    )
}

#[test]
fn plain_fragments_join_into_one_variant() -> Result<()> {
    let fragments = FragmentBuilder::new().add_plain("a").add_plain("b").build();
    let seq = candidate_driver().optimize(&fragments, &PerfParams::new())?;
    assert_eq!(seq, VariantSeq::single(Variant::plain("ab")));
    Ok(())
}

#[test]
fn tuning_candidates_are_wrapped_by_markers() -> Result<()> {
    let seq = candidate_driver().optimize(&[tuning_region(1, Vec::new())], &PerfParams::new())?;
    assert_eq!(
        seq,
        VariantSeq::new(vec![Variant::new("LxT", vec![0]), Variant::new("LyT", vec![1])])
    );
    Ok(())
}

#[test]
fn surrounding_code_is_shared_by_every_variant() -> Result<()> {
    let fragments = FragmentBuilder::new()
        .add_plain("pre")
        .add_fragment(tuning_region(2, Vec::new()))
        .add_plain("post")
        .build();
    let seq = candidate_driver().optimize(&fragments, &PerfParams::new())?;
    assert_eq!(
        seq,
        VariantSeq::new(vec![
            Variant::new("preLxTpost", vec![0]),
            Variant::new("preLyTpost", vec![1]),
        ])
    );
    Ok(())
}

#[test]
fn failing_transformation_aborts_with_line() {
    let mut registry = TransformRegistry::with_default_transforms();
    registry.register(Broken);
    let driver = OptDriver::new(
        DriverConfig::default(),
        registry,
        Arc::new(CandidateTuner(Vec::new())),
    );
    let fragments = FragmentBuilder::new()
        .add_plain("int i;\n")
        .add_region(
            leader("Broken", "", 14),
            vec![CodeFragment::plain("for (i = 0; i < n*n; i++) {}\n")],
            trailer(16),
        )
        .build();

    let err = driver.optimize(&fragments, &PerfParams::new()).unwrap_err();
    assert!(matches!(err, DriverError::Transformation { line: 14, .. }));
    let message = format!("{:#}", anyhow::Error::from(err));
    assert!(message.starts_with("14:"));
    assert!(message.contains("\"Broken\""));
    assert!(message.contains("loop bounds are not affine"));
}

#[test]
fn duplicate_tuning_annotation_rejected_before_tuning() {
    let fragments = vec![tuning_region(1, Vec::new()), tuning_region(20, Vec::new())];
    let err = candidate_driver()
        .optimize(&fragments, &PerfParams::new())
        .unwrap_err();
    assert!(matches!(err, DriverError::DuplicateTuningAnnotation { line: 20 }));
}

fn unroll_specs() -> SpecMap {
    let mut specs = SpecMap::new();
    specs.insert(
        "unroll",
        TuningSpec {
            performance_params: vec![ParamAxis::new(
                "UF",
                vec![ParamValue::Int(16), ParamValue::Int(1), ParamValue::Int(4)],
            )],
            input_params: vec![ParamAxis::new(
                "N",
                vec![ParamValue::Int(100), ParamValue::Int(1000)],
            )],
            ..Default::default()
        },
    );
    specs
}

fn axpy_fragments() -> Vec<CodeFragment> {
    let body = CodeFragment::region(
        leader("Substitute", "", 3).with_text("/*sub*/"),
        vec![CodeFragment::plain("for (i = 0; i < n; i += ${UF}) y[i] += a * x[i];\n")],
        TrailerAnnotation::new("/*end*/", 5),
    );
    FragmentBuilder::new()
        .add_plain("void axpy(int n) {\n")
        .add_fragment(tuning_region(2, vec![body]))
        .add_plain("}\n")
        .build()
}

#[test]
fn spec_tuner_produces_one_variant_per_problem_size() -> Result<()> {
    let tuner = SpecTuner::new(unroll_specs()).with_evaluator(Arc::new(PreferUnroll(4)));
    let driver = OptDriver::new(
        DriverConfig::default(),
        TransformRegistry::with_default_transforms(),
        Arc::new(tuner),
    );

    let seq = driver.optimize(&axpy_fragments(), &PerfParams::new())?;
    assert_eq!(seq.len(), 2);

    for (idx, variant) in seq.iter().enumerate() {
        assert_eq!(variant.choices, vec![idx]);
        assert!(variant
            .code
            .starts_with("void axpy(int n) {\nL\n\n/**-- (Generated by annoforge)\n"));
        assert!(variant.code.contains("  UF = 4\n"));
        assert!(variant
            .code
            .ends_with("/*sub*/for (i = 0; i < n; i += 4) y[i] += a * x[i];\n/*end*/T}\n"));
    }
    assert!(seq.as_slice()[0].code.contains("  N = 100\n"));
    assert!(seq.as_slice()[1].code.contains("  N = 1000\n"));
    Ok(())
}

#[test]
fn parallel_driver_matches_sequential_with_spec_tuner() -> Result<()> {
    let run = |parallel: bool| -> Result<VariantSeq> {
        let driver = OptDriver::new(
            DriverConfig {
                parallel_siblings: parallel,
                ..DriverConfig::default()
            },
            TransformRegistry::with_default_transforms(),
            Arc::new(SpecTuner::new(unroll_specs())),
        );
        Ok(driver.optimize(&axpy_fragments(), &PerfParams::new())?)
    };
    assert_eq!(run(false)?, run(true)?);
    Ok(())
}

#[test]
fn undefined_spec_import_is_fatal() {
    let driver = OptDriver::new(
        DriverConfig::default(),
        TransformRegistry::with_default_transforms(),
        Arc::new(SpecTuner::new(SpecMap::new())),
    );
    let err = driver
        .optimize(&axpy_fragments(), &PerfParams::new())
        .unwrap_err();
    assert!(matches!(err, DriverError::Tuning { line: 2, .. }));
    let message = format!("{:#}", anyhow::Error::from(err));
    assert!(message.contains("undefined specification: \"unroll\""));
}

#[test]
fn fragment_tree_from_json() -> Result<()> {
    let json = r#"[
        {"fragment": "plain", "code": "int main() {\n"},
        {"fragment": "region",
         "leader": {"kind": "Reindent", "kind_line": 2, "body": "", "body_line": 2,
                    "text": "/*@ begin Reindent () @*/\n", "indent": 4},
         "children": [{"fragment": "plain", "code": "return 0;\n"}],
         "trailer": {"text": "/*@ end @*/\n", "line": 4}},
        {"fragment": "plain", "code": "}\n"}
    ]"#;
    let fragments: Vec<CodeFragment> = serde_json::from_str(json)?;
    let seq = candidate_driver().optimize(&fragments, &PerfParams::new())?;
    assert_eq!(
        seq,
        VariantSeq::single(Variant::plain(
            "int main() {\n/*@ begin Reindent () @*/\n    return 0;\n/*@ end @*/\n}\n"
        ))
    );
    Ok(())
}
