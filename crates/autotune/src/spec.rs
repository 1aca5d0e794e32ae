//! Tuning specifications and their lookup from annotation bodies.

use annoforge_ir::params::ParamValue;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// A named parameter and the values it may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamAxis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl ParamAxis {
    pub fn new<N: Into<String>>(name: N, values: Vec<ParamValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    #[default]
    Exhaustive,
    Random,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub algorithm: SearchAlgorithm,
    /// Upper bound on evaluated search points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_runs: Option<usize>,
    /// Wall-clock budget for one problem size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<f64>,
    /// Seed for the random visiting order.
    #[serde(default)]
    pub seed: u64,
}

/// Tuning information for one `PerfTuning` region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TuningSpec {
    /// Parameters explored by the search.
    #[serde(default)]
    pub performance_params: Vec<ParamAxis>,
    /// Problem-size parameters; every combination is tuned separately.
    #[serde(default)]
    pub input_params: Vec<ParamAxis>,
    #[serde(default)]
    pub search: SearchConfig,
}

impl TuningSpec {
    /// Stable identity of the spec, used to key cached tuning results.
    pub fn fingerprint(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Named tuning specifications that annotations can import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecMap {
    specs: BTreeMap<String, TuningSpec>,
}

impl SpecMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<N: Into<String>>(&mut self, name: N, spec: TuningSpec) {
        self.specs.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&TuningSpec> {
        self.specs.get(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read tuning specs from {}", path.display()))?;
        let specs = serde_json::from_slice(&data)
            .with_context(|| format!("malformed tuning specs in {}", path.display()))?;
        Ok(specs)
    }

    /// Resolve the tuning spec of an annotation body.
    ///
    /// A body of the form `import spec NAME;` names an entry of this map;
    /// anything else is parsed as an inline JSON spec. Returns a label for
    /// logging together with the spec.
    pub fn extract(&self, body: &str, line: usize) -> Result<(String, TuningSpec)> {
        if let Some(captures) = import_re().captures(body) {
            let name = &captures[1];
            let name_start = captures.get(1).map(|m| m.start()).unwrap_or(0);
            let name_line = line + body[..name_start].matches('\n').count();
            let spec = self
                .get(name)
                .ok_or_else(|| anyhow!("{}: undefined specification: \"{}\"", name_line, name))?;
            return Ok((name.to_string(), spec.clone()));
        }

        let spec = serde_json::from_str(body)
            .with_context(|| format!("{}: malformed inline tuning specification", line))?;
        Ok((format!("inline@{}", line), spec))
    }
}

fn import_re() -> &'static Regex {
    static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
    IMPORT_RE.get_or_init(|| {
        Regex::new(r"^\s*import\s+spec\s+([A-Za-z_]\w*);\s*$").expect("import pattern is valid")
    })
}
