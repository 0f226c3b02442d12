//! # cf-scan
//!
//! Single-pass scan engine for line-oriented collision event logs.
//!
//! One synchronous producer/consumer chain: the [`EventParser`] yields
//! events and their raw jet lines from a bounded [`LineReader`], the pass
//! in [`pass`] assembles each jet row, tests it against every cut, and
//! feeds matching rows into the cut's histograms. Nothing larger than a
//! single line and a single jet row is ever buffered.
//!
//! ## Example
//!
//! ```no_run
//! use cf_core::Format;
//! use cf_scan::{scan_path, ScanSpec};
//!
//! let format = Format::newer();
//! let spec = ScanSpec {
//!     take_num: 2,
//!     skip_num: 0,
//!     strict: false,
//!     event_probability_multiplier: f64::NAN,
//!     random_seed: 0,
//!     cuts: vec![],
//! };
//! let result = scan_path(&format, "events.txt".as_ref(), &spec, true).unwrap();
//! println!("csOnW = {}", result.cs_on_w);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod line_reader;
pub mod pass;
pub mod progress;

pub use event::{EventParser, EventRecord, GLUON_FLAG_UNKNOWN};
pub use line_reader::{LineReader, MAX_LINE_LENGTH};
pub use pass::{scan, scan_path, CutResult, ScanResult, ScanSpec};
pub use progress::Progress;
