//! Error types for cutflow.

use thiserror::Error;

/// Errors that can occur configuring or running a scan pass.
///
/// Every variant is fatal to the pass: errors propagate to the top and
/// abort the run, nothing is caught and retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading the event log.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the fixed line-buffer size.
    #[error("line {line} exceeds maximum length of {max} bytes")]
    LineTooLong {
        /// 1-based line number in the input file.
        line: u64,
        /// The configured line-buffer size.
        max: usize,
    },

    /// Structural violation in the event log.
    #[error("malformed input at line {line}: {context}")]
    Malformed {
        /// 1-based line number in the input file.
        line: u64,
        /// What was expected or found.
        context: String,
    },

    /// The file ended in the middle of an event block.
    #[error("unexpected end of file {context}")]
    UnexpectedEof {
        /// Where in the event block the file ended.
        context: String,
    },

    /// A numeric token failed to parse.
    #[error("invalid number {token:?} at line {line}")]
    InvalidNumber {
        /// 1-based line number in the input file.
        line: u64,
        /// The offending token.
        token: String,
    },

    /// A jet row had the wrong number of values after splicing.
    #[error("expected jet to have {expected} values, but encountered {actual}")]
    JetLength {
        /// `Format::num_vars` for the active layout.
        expected: usize,
        /// Number of values actually assembled.
        actual: usize,
    },

    /// Non-integer value fed to an integer-keyed histogram.
    #[error("used integer binning, but encountered non-integer {0}")]
    NonIntegerBin(f64),

    /// A cut clause referenced a column past the end of the jet row.
    #[error("variable {index} out of range for jet of {len} values")]
    VariableOutOfRange {
        /// The clause's column index.
        index: usize,
        /// Length of the jet row it was tested against.
        len: usize,
    },

    /// Variable name not present in the column layout.
    #[error("unrecognized variable {0}")]
    UnknownVariable(String),

    /// Histogram binning rejected at construction.
    #[error("invalid binning: {0}")]
    InvalidBinning(String),

    /// Selection spec text failed to parse.
    #[error("spec error: {0}")]
    Spec(String),
}

/// Result alias for cutflow operations.
pub type Result<T> = std::result::Result<T, Error>;
