//! Result caching for empirical tuning.

use crate::space::ProblemSize;
use annoforge_ir::params::PerfParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Best parameters found for one spec and problem size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunedParams {
    pub params: PerfParams,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuningCache {
    entries: BTreeMap<String, TunedParams>,
}

impl TuningCache {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: &str, problem: &ProblemSize) -> Option<&TunedParams> {
        self.entries.get(&cache_key(fingerprint, problem))
    }

    pub fn insert(&mut self, fingerprint: &str, problem: &ProblemSize, tuned: TunedParams) {
        self.entries.insert(cache_key(fingerprint, problem), tuned);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let data = fs::read(path)?;
        let cache = serde_json::from_slice(&data)?;
        Ok(cache)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let blob = serde_json::to_vec_pretty(self)?;
        fs::write(path, blob)?;
        Ok(())
    }
}

fn cache_key(fingerprint: &str, problem: &ProblemSize) -> String {
    format!("{}|{}", fingerprint, problem.key())
}
