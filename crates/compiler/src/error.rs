//! Optimization driver errors.

use thiserror::Error;

/// Fatal conditions detected while optimizing a fragment tree.
///
/// Every variant carries the source line of the offending annotation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{line}: the total number of performance-tuning annotations cannot be more than one")]
    DuplicateTuningAnnotation { line: usize },

    #[error("{line}: performance-tuning annotations must be defined at top level and cannot be nested")]
    NestedTuningAnnotation { line: usize },

    #[error("{line}: internal error: the optimized body code of annotation \"{kind}\" cannot be multiple versions")]
    MultipleVersions { kind: String, line: usize },

    #[error("{line}: internal error: annotation \"{kind}\" produced no code versions")]
    EmptyVariants { kind: String, line: usize },

    #[error("{line}: no transformation registered for annotation \"{kind}\"")]
    UnknownTransformation { kind: String, line: usize },

    #[error("{line}: encountered an error when transforming annotation \"{kind}\"")]
    Transformation {
        kind: String,
        line: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("{line}: empirical performance tuning failed")]
    Tuning {
        line: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl DriverError {
    pub fn line(&self) -> usize {
        match self {
            DriverError::DuplicateTuningAnnotation { line }
            | DriverError::NestedTuningAnnotation { line }
            | DriverError::MultipleVersions { line, .. }
            | DriverError::EmptyVariants { line, .. }
            | DriverError::UnknownTransformation { line, .. }
            | DriverError::Transformation { line, .. }
            | DriverError::Tuning { line, .. } => *line,
        }
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
