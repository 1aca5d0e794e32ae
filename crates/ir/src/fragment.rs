//! Code fragment tree definitions.

use serde::{Deserialize, Serialize};

/// Annotation kind reserved for empirical performance tuning.
pub const PERF_TUNING_KIND: &str = "PerfTuning";

/// Opening marker of an annotated region, e.g. `/*@ begin Kind (...) @*/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderAnnotation {
    /// Declared module name, used to pick a tuner or transformation.
    pub kind: String,
    /// Line on which `kind` appears.
    pub kind_line: usize,
    /// Raw annotation body handed to the transformation or tuner.
    pub body: String,
    /// Line on which `body` starts.
    pub body_line: usize,
    /// Literal leader text, emitted verbatim before the generated code.
    pub text: String,
    /// Indentation width of the enclosing context.
    #[serde(default)]
    pub indent: usize,
}

impl LeaderAnnotation {
    pub fn new<K, B>(kind: K, body: B, line: usize) -> Self
    where
        K: Into<String>,
        B: Into<String>,
    {
        let kind = kind.into();
        let body = body.into();
        let text = format!("/*@ begin {} ({}) @*/", kind, body);
        Self {
            kind,
            kind_line: line,
            body,
            body_line: line,
            text,
            indent: 0,
        }
    }

    pub fn with_text<T: Into<String>>(mut self, text: T) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_body_line(mut self, line: usize) -> Self {
        self.body_line = line;
        self
    }

    pub fn is_perf_tuning(&self) -> bool {
        self.kind == PERF_TUNING_KIND
    }
}

/// Closing marker of an annotated region, e.g. `/*@ end @*/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerAnnotation {
    pub text: String,
    pub line: usize,
}

impl TrailerAnnotation {
    pub fn new<T: Into<String>>(text: T, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }
}

/// Literal source code carrying no annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainFragment {
    pub code: String,
}

/// Source span delimited by a leader/trailer annotation pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRegion {
    pub leader: LeaderAnnotation,
    #[serde(default)]
    pub children: Vec<CodeFragment>,
    pub trailer: TrailerAnnotation,
}

impl AnnotatedRegion {
    pub fn is_perf_tuning(&self) -> bool {
        self.leader.is_perf_tuning()
    }
}

/// One node of the fragment tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fragment", rename_all = "snake_case")]
pub enum CodeFragment {
    Plain(PlainFragment),
    Region(AnnotatedRegion),
}

impl CodeFragment {
    pub fn plain<C: Into<String>>(code: C) -> Self {
        CodeFragment::Plain(PlainFragment { code: code.into() })
    }

    pub fn region(
        leader: LeaderAnnotation,
        children: Vec<CodeFragment>,
        trailer: TrailerAnnotation,
    ) -> Self {
        CodeFragment::Region(AnnotatedRegion {
            leader,
            children,
            trailer,
        })
    }

    pub fn as_region(&self) -> Option<&AnnotatedRegion> {
        match self {
            CodeFragment::Region(region) => Some(region),
            CodeFragment::Plain(_) => None,
        }
    }
}
