//! FMG codec and carry engine
//!
//! - [`error`] - Error types for codec and carry operations
//! - [`header`] - Fixed header and range records
//! - [`string`] - Null-terminated UTF-16LE strings
//! - [`container`] - In-memory identifier to text mapping
//! - [`io`] - Whole-file decode/encode, staged saves
//! - [`carry`] - Three-way carry engine
//! - [`notation`] - Review file notation and overrides
//! - [`config`] - Run configuration
//!
//! Everything here works on in-memory containers and caller-supplied streams;
//! directory walking lives outside the core.

pub mod carry;
pub mod config;
pub mod container;
pub mod error;
pub mod header;
pub mod io;
pub mod notation;
pub mod string;

pub use carry::{CarryEngine, CarryPlan, Decision, DecisionKind};
pub use config::CarryConfig;
pub use container::{is_blank, Container, Lookup};
pub use error::{FmgError, Result};
pub use header::{FmgHeader, FmgRange};
pub use io::{build_ranges, decode, encode, inspect, load, save, save_as, ContainerStats};
pub use notation::{
    load_overrides, parse_overrides, quote, unquote, write_report, Marker, Overrides,
    ReportRecord,
};
pub use string::{read_string, write_string};
