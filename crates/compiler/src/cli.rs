//! CLI wiring for the annoforge optimizer.

use crate::config::DriverConfig;
use crate::driver::OptDriver;
use crate::files::{emit_variants, load_fragments};
use crate::validate::check_perf_tuning_annotations;
use annoforge_autotune::cache::TuningCache;
use annoforge_autotune::spec::SpecMap;
use annoforge_autotune::tuner::SpecTuner;
use annoforge_ir::params::PerfParams;
use annoforge_transforms::registry::TransformRegistry;
use annoforge_transforms::transform::TargetLanguage;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "annoforge", about = "Annotation-driven source-to-source optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum LanguageArg {
    C,
    Fortran,
    Cuda,
}

impl From<LanguageArg> for TargetLanguage {
    fn from(value: LanguageArg) -> TargetLanguage {
        match value {
            LanguageArg::C => TargetLanguage::C,
            LanguageArg::Fortran => TargetLanguage::Fortran,
            LanguageArg::Cuda => TargetLanguage::Cuda,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the placement of performance-tuning annotations.
    Validate {
        /// Fragment tree in JSON form.
        #[arg(long)]
        input: PathBuf,
    },
    /// Optimize a fragment tree and write one file per resulting variant.
    Optimize {
        /// Fragment tree in JSON form.
        #[arg(long)]
        input: PathBuf,
        /// Named tuning specifications importable by `PerfTuning` annotations.
        #[arg(long)]
        specs: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "c")]
        language: LanguageArg,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Source file name the output names derive from; defaults to the
        /// input file stem with the target language's extension.
        #[arg(long)]
        name: Option<String>,
        /// Optimize sibling fragments in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,
        #[arg(long)]
        tuning_cache: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        clear_tuning_cache: bool,
    },
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    match cli.command {
        Command::Validate { input } => {
            let fragments = load_fragments(&input)?;
            check_perf_tuning_annotations(&fragments)?;
            println!("{}: annotations are well placed", input.display());
        }
        Command::Optimize {
            input,
            specs,
            language,
            output_dir,
            name,
            parallel,
            tuning_cache,
            clear_tuning_cache,
        } => {
            let fragments = load_fragments(&input)?;
            let specs = match specs {
                Some(path) => SpecMap::load_from_file(&path)?,
                None => SpecMap::new(),
            };

            let mut tuner = SpecTuner::new(specs);
            if let Some(path) = &tuning_cache {
                let cache = if clear_tuning_cache {
                    TuningCache::new()
                } else {
                    TuningCache::load_from_file(path).unwrap_or_else(|err| {
                        warn!(
                            path = %path.display(),
                            error = %err,
                            "ignoring unreadable tuning cache"
                        );
                        TuningCache::new()
                    })
                };
                tuner = tuner.with_cache(cache);
            }
            let tuner = Arc::new(tuner);

            let config = DriverConfig {
                language: language.into(),
                parallel_siblings: parallel,
            };
            let driver = OptDriver::new(
                config,
                TransformRegistry::with_default_transforms(),
                tuner.clone(),
            );

            let variants = driver.optimize(&fragments, &PerfParams::new())?;
            info!(variants = variants.len(), "optimization completed");

            let name = name.unwrap_or_else(|| default_output_name(&input, config.language));
            let written = emit_variants(&output_dir, &name, &variants)?;
            for path in &written {
                println!("{}", path.display());
            }

            if let (Some(path), Some(cache)) = (&tuning_cache, tuner.cache_snapshot()?) {
                if let Err(err) = cache.save_to_file(path) {
                    warn!(path = %path.display(), error = %err, "failed to save tuning cache");
                }
            }
        }
    }
    Ok(())
}

fn default_output_name(input: &std::path::Path, language: TargetLanguage) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = match language {
        TargetLanguage::C => "c",
        TargetLanguage::Fortran => "f90",
        TargetLanguage::Cuda => "cu",
    };
    format!("{}.{}", stem, ext)
}
