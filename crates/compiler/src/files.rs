//! Reading fragment trees and writing optimized variants.

use annoforge_ir::fragment::CodeFragment;
use annoforge_ir::variant::VariantSeq;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load a fragment sequence from its JSON interchange form.
pub fn load_fragments(path: &Path) -> Result<Vec<CodeFragment>> {
    let blob = fs::read_to_string(path)
        .with_context(|| format!("failed to read fragment tree {}", path.display()))?;
    let fragments = serde_json::from_str(&blob)
        .with_context(|| format!("malformed fragment tree in {}", path.display()))?;
    Ok(fragments)
}

/// Output file names for `count` variants of the source file `name`.
///
/// A single variant is written to `_<name>`; several are numbered in
/// variant order as `_<stem>.v<i>.<ext>`.
pub fn output_paths(dir: &Path, name: &str, count: usize) -> Vec<PathBuf> {
    if count == 1 {
        return vec![dir.join(format!("_{}", name))];
    }

    let source = Path::new(name);
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = source.extension().map(|e| e.to_string_lossy().into_owned());

    (0..count)
        .map(|i| {
            let file = match &ext {
                Some(ext) => format!("_{}.v{}.{}", stem, i, ext),
                None => format!("_{}.v{}", stem, i),
            };
            dir.join(file)
        })
        .collect()
}

/// Write one file per variant and return the written paths.
pub fn emit_variants(dir: &Path, name: &str, variants: &VariantSeq) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let paths = output_paths(dir, name, variants.len());
    for (path, variant) in paths.iter().zip(variants) {
        fs::write(path, &variant.code)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), choices = ?variant.choices, "wrote optimized variant");
    }
    Ok(paths)
}
