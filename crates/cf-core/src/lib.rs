//! # cf-core
//!
//! Core data model for cutflow: column layouts, range cuts, and weighted
//! histograms with propagated statistical errors.
//!
//! The scan pass itself lives in `cf-scan`; this crate holds the leaf
//! types it accumulates into.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cut;
pub mod error;
pub mod format;
pub mod histogram;

pub use cut::{Cut, CutClause};
pub use error::{Error, Result};
pub use format::{Format, SPLICED_COLS};
pub use histogram::{BinHistogram, Histogram, IntHistogram};

/// One assembled jet row: exactly `Format::num_vars` values in column
/// layout order. Created transiently per jet line and discarded after
/// being tested against all cuts.
pub type Jet = Vec<f64>;
