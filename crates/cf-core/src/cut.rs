//! Range cuts over assembled jet rows.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::histogram::Histogram;
use crate::Jet;

/// Inclusive range predicate over one jet column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutClause {
    /// Column index in the assembled jet row.
    pub var_index: usize,
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
}

impl CutClause {
    /// Test the clause against an assembled jet row.
    ///
    /// An out-of-range column index is a configuration error, detected
    /// lazily on first evaluation.
    pub fn matches(&self, jet: &Jet) -> Result<bool> {
        let val = *jet.get(self.var_index).ok_or(Error::VariableOutOfRange {
            index: self.var_index,
            len: jet.len(),
        })?;
        Ok(self.min <= val && val <= self.max)
    }
}

/// A conjunction of range clauses plus the histograms filled from jets
/// that pass it.
///
/// Cuts are independent of each other: the same jet stream is tested
/// against every configured cut during a single pass.
#[derive(Debug, Clone)]
pub struct Cut {
    /// Range clauses, all of which must match.
    pub clauses: Vec<CutClause>,
    /// Histogram requests attached to this cut.
    pub histograms: Vec<Histogram>,
}

impl Cut {
    /// True iff every clause matches the jet.
    pub fn matches(&self, jet: &Jet) -> Result<bool> {
        for clause in &self.clauses {
            if !clause.matches(jet)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
