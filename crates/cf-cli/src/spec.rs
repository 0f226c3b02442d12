//! Selection-spec text parsing.
//!
//! Whitespace-delimited tokens, case-sensitive keywords:
//!
//! ```text
//! takeNum: <uint>
//! skipNum: <uint>
//! strict: true|false
//! eventProbabilityMultiplier: <double|nan>
//! randomSeed: <int64>
//! ( new_cut
//!   ( <varName> <min> <max>
//!   | histogram_ints: <varName>
//!   | histogram: <varName> <min> <max> <binCount>
//!   | histogram_custom: <varName> <endpoint>+ )*
//! )*
//! ```
//!
//! A cut with clauses but no histograms (or the reverse) is a fatal
//! configuration error; a fully empty trailing `new_cut` is ignored.

use cf_core::{BinHistogram, Cut, CutClause, Error, Format, Histogram, IntHistogram, Result};
use cf_scan::ScanSpec;

/// Parse the selection-spec text against a column layout.
pub fn parse_spec(format: &Format, text: &str) -> Result<ScanSpec> {
    let mut tokens = Tokens::new(text);

    tokens.consume("takeNum:")?;
    let take_num = tokens.next_uint("integer")?;

    tokens.consume("skipNum:")?;
    let skip_num = tokens.next_uint("integer")?;

    tokens.consume("strict:")?;
    let strict = match tokens.next_word("boolean")? {
        "true" => true,
        "false" => false,
        other => {
            return Err(Error::Spec(format!(
                "expected strict: true or strict: false; found {other}"
            )));
        }
    };

    tokens.consume("eventProbabilityMultiplier:")?;
    let event_probability_multiplier = tokens.next_f64("double")?;

    tokens.consume("randomSeed:")?;
    let random_seed = tokens.next_i64("integer")?;

    let mut cuts = Vec::new();
    let mut cut = PendingCut::default();

    while let Some(directive) = tokens.next_opt() {
        match directive {
            "new_cut" => cut.finish_into(&mut cuts)?,
            "histogram_ints:" => {
                let name = tokens.next_word("variable name")?;
                let index = format.var(name)?;
                cut.histograms.push(Histogram::Ints(IntHistogram::new(name, index)));
            }
            "histogram:" => {
                let name = tokens.next_word("variable name")?;
                let index = format.var(name)?;
                let min = tokens.next_f64(&format!("min value for {name}"))?;
                let max = tokens.next_f64(&format!("max value for {name}"))?;
                let n_bins = tokens.next_uint(&format!("number of bins for {name}"))?;
                cut.histograms
                    .push(Histogram::Bins(BinHistogram::uniform(name, index, min, max, n_bins)?));
            }
            "histogram_custom:" => {
                let name = tokens.next_word("variable name")?;
                let index = format.var(name)?;
                let endpoints = tokens.f64s_to_end_of_line()?;
                cut.histograms
                    .push(Histogram::Bins(BinHistogram::with_endpoints(name, index, endpoints)?));
            }
            name => {
                let index = format.var(name)?;
                let min = tokens.next_f64(&format!("min value for {name}"))?;
                let max = tokens.next_f64(&format!("max value for {name}"))?;
                cut.clauses.push(CutClause { var_index: index, min, max });
            }
        }
    }
    cut.finish_into(&mut cuts)?;

    Ok(ScanSpec { take_num, skip_num, strict, event_probability_multiplier, random_seed, cuts })
}

/// A cut block under construction.
#[derive(Default)]
struct PendingCut {
    clauses: Vec<CutClause>,
    histograms: Vec<Histogram>,
}

impl PendingCut {
    /// Flush a completed cut block; an untouched block is ignored.
    fn finish_into(&mut self, cuts: &mut Vec<Cut>) -> Result<()> {
        if self.clauses.is_empty() && self.histograms.is_empty() {
            return Ok(());
        }
        if self.clauses.is_empty() {
            return Err(Error::Spec("cut didn't have any clauses".into()));
        }
        if self.histograms.is_empty() {
            return Err(Error::Spec("cut didn't have any histograms".into()));
        }
        cuts.push(Cut {
            clauses: std::mem::take(&mut self.clauses),
            histograms: std::mem::take(&mut self.histograms),
        });
        Ok(())
    }
}

/// Cursor over whitespace-delimited tokens, with one line-oriented
/// escape hatch for `histogram_custom:` endpoint lists.
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn next_opt(&mut self) -> Option<&'a str> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return None;
        }
        let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
        let (word, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(word)
    }

    fn next_word(&mut self, description: &str) -> Result<&'a str> {
        self.next_opt().ok_or_else(|| Error::Spec(format!("expected {description} in spec")))
    }

    fn consume(&mut self, expected: &str) -> Result<()> {
        let actual = self.next_word(&format!("'{expected}'"))?;
        if actual != expected {
            return Err(Error::Spec(format!("expected '{expected}' but found {actual}")));
        }
        Ok(())
    }

    fn next_f64(&mut self, description: &str) -> Result<f64> {
        let word = self.next_word(description)?;
        word.parse().map_err(|_| Error::Spec(format!("expected {description}, found {word}")))
    }

    fn next_uint(&mut self, description: &str) -> Result<usize> {
        let word = self.next_word(description)?;
        word.parse().map_err(|_| Error::Spec(format!("expected {description}, found {word}")))
    }

    fn next_i64(&mut self, description: &str) -> Result<i64> {
        let word = self.next_word(description)?;
        word.parse().map_err(|_| Error::Spec(format!("expected {description}, found {word}")))
    }

    /// All values up to the end of the current line.
    fn f64s_to_end_of_line(&mut self) -> Result<Vec<f64>> {
        let end = self.rest.find('\n').unwrap_or(self.rest.len());
        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;

        let mut out = Vec::new();
        for word in line.split_whitespace() {
            let value = word
                .parse()
                .map_err(|_| Error::Spec(format!("expected bin endpoint, found {word}")))?;
            out.push(value);
        }
        if out.is_empty() {
            return Err(Error::Spec("expected bin endpoints in spec".into()));
        }
        Ok(out)
    }
}
