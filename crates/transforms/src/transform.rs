//! Transformation interface.

use annoforge_ir::params::PerfParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Language of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    C,
    Fortran,
    Cuda,
}

impl TargetLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLanguage::C => "c",
            TargetLanguage::Fortran => "fortran",
            TargetLanguage::Cuda => "cuda",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a transformation is configured with.
#[derive(Debug, Clone, Copy)]
pub struct TransformInputs<'a> {
    /// Performance parameters in effect for this pass.
    pub params: &'a PerfParams,
    /// Raw annotation body of the region's leader.
    pub annotation: &'a str,
    /// Already optimized code of the region's children.
    pub body: &'a str,
    /// Line on which the annotation body starts.
    pub line: usize,
    /// Indentation width of the enclosing context.
    pub indent: usize,
    pub language: TargetLanguage,
}

pub trait Transformation {
    /// Produce the optimized code for the configured region.
    fn transform(&self) -> Result<String>;
}

pub trait TransformFactory: Send + Sync {
    /// Annotation kind this factory answers to.
    fn name(&self) -> &str;

    fn create<'a>(&self, inputs: TransformInputs<'a>) -> Result<Box<dyn Transformation + 'a>>;
}

pub type DynTransformFactory = Arc<dyn TransformFactory>;
