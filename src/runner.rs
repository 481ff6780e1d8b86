//! Driving a whole run
//!
//! Files are processed one at a time in discovery order. Merge mode (an
//! override directory was given) rewrites translation files in place; report
//! mode writes a review file per container whose source text changed.

use crate::carry::CarryEngine;
use crate::config::CarryConfig;
use crate::discovery::{discover, FileSet, Roots};
use crate::error::{FmgError, Result};
use crate::io::{load, save};
use crate::notation::{load_overrides, write_report};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Run-level errors
#[derive(Error, Debug)]
pub enum RunError {
    #[error("FMG error: {0}")]
    Fmg(#[from] FmgError),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to process {path:?}: {source}")]
    Failed {
        path: PathBuf,
        #[source]
        source: FmgError,
    },
}

pub type RunResult<T> = std::result::Result<T, RunError>;

/// Whether translations are rewritten or review files are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Merge,
    Report,
}

/// What happened to one file set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Translation rewritten with `changes` carried identifiers
    Written { changes: usize },
    /// Review file written for `changes` changed identifiers
    Reported { path: PathBuf, changes: usize },
    /// Nothing changed; no file touched
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Totals for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub processed: usize,
    pub written: usize,
    pub reports: usize,
    pub unchanged: usize,
    pub carried: usize,
    pub failed: Vec<FailedFile>,
}

impl RunSummary {
    fn new(mode: Mode) -> Self {
        RunSummary {
            mode,
            processed: 0,
            written: 0,
            reports: 0,
            unchanged: 0,
            carried: 0,
            failed: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Runner {
    roots: Roots,
    config: CarryConfig,
    engine: CarryEngine,
}

impl Runner {
    pub fn new(roots: Roots, config: CarryConfig) -> Self {
        let engine = CarryEngine::new(&config);
        Runner {
            roots,
            config,
            engine,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.roots.overrides.is_some() {
            Mode::Merge
        } else {
            Mode::Report
        }
    }

    pub fn config(&self) -> &CarryConfig {
        &self.config
    }

    /// Process every discovered file set
    ///
    /// Stops at the first failing file unless `keep_going` is set, in which
    /// case failures are collected in the summary.
    pub fn run(&self) -> RunResult<RunSummary> {
        let mode = self.mode();
        let sets = discover(&self.roots, &self.config)?;
        info!("Found {} file(s) to process in {:?} mode", sets.len(), mode);

        let mut summary = RunSummary::new(mode);
        for set in &sets {
            info!("Processing {}...", set.relative.display());
            match self.process(set) {
                Ok(outcome) => {
                    summary.processed += 1;
                    match outcome {
                        FileOutcome::Written { changes } => {
                            summary.written += 1;
                            summary.carried += changes;
                        }
                        FileOutcome::Reported { changes, .. } => {
                            summary.reports += 1;
                            summary.carried += changes;
                        }
                        FileOutcome::Unchanged => summary.unchanged += 1,
                    }
                    info!("Done {}", set.relative.display());
                }
                Err(e) if self.config.keep_going => {
                    error!("Failed {}: {}", set.relative.display(), e);
                    summary.failed.push(FailedFile {
                        path: set.relative.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(RunError::Failed {
                        path: set.relative.clone(),
                        source: e,
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Reconcile one file set according to the run mode
    pub fn process(&self, set: &FileSet) -> Result<FileOutcome> {
        let base = load(&set.base)?;
        let updated = load(&set.updated)?;
        let mut translation = load(&set.translation)?;

        match &set.overrides {
            Some(overrides_path) => {
                let overrides = load_overrides(overrides_path)?;
                let plan = self
                    .engine
                    .plan(&base, &updated, &translation, Some(&overrides));
                if plan.is_noop() {
                    return Ok(FileOutcome::Unchanged);
                }

                let changes = self.engine.apply(&plan, &mut translation);
                save(&translation)?;
                info!(
                    "Carried {} entries into {:?}",
                    changes,
                    translation.path()
                );
                Ok(FileOutcome::Written { changes })
            }
            None => {
                let plan = self.engine.plan(&base, &updated, &translation, None);
                let records = self.engine.report(&plan);
                let path = self.config.report_dir.join(set.review_path(&self.config));

                if records.is_empty() {
                    remove_stale(&path)?;
                    return Ok(FileOutcome::Unchanged);
                }

                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut writer = BufWriter::new(File::create(&path)?);
                write_report(&mut writer, &records)?;
                info!("Wrote {} review lines to {:?}", records.len(), path);

                Ok(FileOutcome::Reported {
                    path,
                    changes: plan.change_count(),
                })
            }
        }
    }
}

/// A review file left from an earlier run no longer applies
fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed stale review file {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
