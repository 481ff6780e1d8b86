//! # fmg-carry - FMG Localization Containers and Translation Carry
//!
//! `fmg-carry` reads and writes FMG files, the binary string tables a game
//! engine uses to map integer identifiers to UTF-16 text, and carries text
//! changes from an updated source language into an existing translation
//! without losing the translator's edits.
//!
//! - **Byte-exact codec**: range-compressed identifiers, 64-bit offset table,
//!   null-terminated UTF-16LE strings, 4-byte alignment
//! - **Three-way carry**: only identifiers whose source text changed are
//!   touched; everything else keeps its translation
//! - **Review workflow**: report mode emits a `<` / `>` / `-` / `=` review file,
//!   merge mode reads the filled-in `=` lines back as overrides
//! - **Staged writes**: files are encoded to a temporary file and renamed
//!   into place only on success
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fmg_carry::{load, save, CarryEngine, Result};
//!
//! # fn main() -> Result<()> {
//! let base = load("old/en/item.fmg")?;
//! let updated = load("new/en/item.fmg")?;
//! let mut translation = load("fr/item.fmg")?;
//!
//! let engine = CarryEngine::default();
//! let plan = engine.plan(&base, &updated, &translation, None);
//! if !plan.is_noop() {
//!     engine.apply(&plan, &mut translation);
//!     save(&translation)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Whole Directory Trees
//!
//! ```rust,no_run
//! use fmg_carry::{CarryConfig, Roots, Runner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Report mode: no override directory
//! let roots = Roots::new("old/en", "new/en", "fr");
//! let summary = Runner::new(roots, CarryConfig::default()).run()?;
//! println!("{} review files written", summary.reports);
//!
//! // Merge mode: reviewed files in "reviews/"
//! let roots = Roots::new("old/en", "new/en", "fr").with_overrides("reviews");
//! Runner::new(roots, CarryConfig::default()).run()?;
//! # Ok(())
//! # }
//! ```

// Codec and carry engine
pub mod core;

pub mod discovery;
pub mod runner;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use self::core::{carry, config, container, error, header, io, notation, string};

pub use crate::core::{
    build_ranges, decode, encode, inspect, is_blank, load, load_overrides, parse_overrides,
    quote, read_string, save, save_as, unquote, write_report, write_string, CarryConfig,
    CarryEngine, CarryPlan, Container, ContainerStats, Decision, DecisionKind, FmgError,
    FmgHeader, FmgRange, Lookup, Marker, Overrides, ReportRecord, Result,
};
pub use discovery::{discover, FileSet, Roots};
pub use runner::{FailedFile, FileOutcome, Mode, RunError, RunResult, RunSummary, Runner};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
