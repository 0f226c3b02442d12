//! Event stream parser.
//!
//! Walks the block-structured event log one line at a time and yields one
//! [`EventRecord`] per `New Event` block, then streams that block's raw
//! jet lines to the caller without ever materializing the whole event.
//!
//! Block grammar (one header line is skipped before the first event):
//!
//! ```text
//! Event      := "New Event" NEWLINE WeightLine JetBlock
//! WeightLine := WEIGHT "," CROSS_SECTION NEWLINE
//! JetBlock   := [GluonLine] [MuonLine MuonLine] JetLine*
//! GluonLine  := "H" DOUBLE{6} INT INT NEWLINE      ; ints in {0, 1, 2}
//! MuonLine   := "M" DOUBLE{4} NEWLINE
//! JetLine    := DOUBLE ("," DOUBLE)* NEWLINE
//! ```
//!
//! End of input is legal only at the end of a jet block; reaching it
//! after a gluon line or after the first muon line is fatal.

use std::io::BufRead;

use cf_core::{Error, Result};

use crate::line_reader::LineReader;

/// Sentinel stored in the gluon-flag columns when no H line was present.
pub const GLUON_FLAG_UNKNOWN: f64 = 2.0;

/// Per-event quantities parsed before any jet line is consumed.
///
/// Optional blocks are `None` here; the sentinel encodings (flag value
/// `2`, five infinities) are produced only when splicing into a jet row.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Simulation weight from the event's weight line.
    pub weight: f64,
    /// Cross-section sample from the event's weight line.
    pub cross_section: f64,
    /// Gluon-origin flags from an optional H line.
    pub gluon_flags: Option<(u8, u8)>,
    /// Summed muon-pair four-vector plus its rapidity, from an optional
    /// pair of M lines.
    pub z_frame: Option<[f64; 5]>,
}

/// Streaming parser over one event log.
///
/// Drive it with [`next_event`](Self::next_event), then drain the
/// event's jets with [`has_jet`](Self::has_jet) plus either
/// [`read_jet`](Self::read_jet) or [`skip_jet_line`](Self::skip_jet_line)
/// before asking for the next event.
pub struct EventParser<R> {
    reader: LineReader<R>,
    has_line: bool,
}

impl<R: BufRead> EventParser<R> {
    /// Skip the header line and position on the first event.
    pub fn new(mut reader: LineReader<R>) -> Result<Self> {
        reader.next_line()?;
        let has_line = reader.next_line()?;
        Ok(Self { reader, has_line })
    }

    /// Begin the next event block. Returns `Ok(None)` once the stream is
    /// exhausted.
    pub fn next_event(&mut self) -> Result<Option<EventRecord>> {
        if !self.has_line {
            return Ok(None);
        }
        let (weight, cross_section) = self.read_weight_line()?;
        let mut record = EventRecord { weight, cross_section, gluon_flags: None, z_frame: None };

        if !self.advance()? {
            // a zero-jet event may legally end the stream here
            return Ok(Some(record));
        }
        if self.reader.peek()? == 'H' {
            record.gluon_flags = Some(self.read_gluon_line()?);
            if !self.advance()? {
                return Err(Error::UnexpectedEof { context: "after gluon flag line".into() });
            }
        }
        if self.reader.peek()? == 'M' {
            record.z_frame = Some(self.read_muon_pair()?);
            // end of input after the complete pair ends the jet block
            self.advance()?;
        }
        Ok(Some(record))
    }

    /// Whether a jet line is pending in the current event block.
    pub fn has_jet(&mut self) -> Result<bool> {
        if !self.has_line {
            return Ok(false);
        }
        Ok(self.reader.peek()? != 'N')
    }

    /// Parse the current jet line into `out` and advance past it.
    pub fn read_jet(&mut self, out: &mut Vec<f64>) -> Result<()> {
        out.clear();
        self.reader.read_comma_separated(out)?;
        self.advance()?;
        Ok(())
    }

    /// Advance past the current jet line without parsing its fields.
    pub fn skip_jet_line(&mut self) -> Result<()> {
        self.advance()?;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        self.has_line = self.reader.next_line()?;
        Ok(self.has_line)
    }

    fn read_weight_line(&mut self) -> Result<(f64, f64)> {
        self.reader.skip("New Event")?;
        if !self.advance()? {
            return Err(Error::UnexpectedEof { context: "after \"New Event\"".into() });
        }
        let weight = self.reader.read_f64()?;
        self.reader.skip_whitespace();
        self.reader.skip_char(',')?;
        let cross_section = self.reader.read_f64()?;
        self.reader.skip_whitespace();
        if !self.reader.used_whole_line() {
            return Err(self.reader.malformed("trailing content on weight line"));
        }
        Ok((weight, cross_section))
    }

    fn read_gluon_line(&mut self) -> Result<(u8, u8)> {
        self.reader.skip_char('H')?;
        for _ in 0..6 {
            self.reader.read_f64()?;
        }
        let g1 = self.gluon_flag()?;
        let g2 = self.gluon_flag()?;
        Ok((g1, g2))
    }

    fn gluon_flag(&mut self) -> Result<u8> {
        let val = self.reader.read_f64()?;
        if val == 0.0 || val == 1.0 || val == 2.0 {
            Ok(val as u8)
        } else {
            Err(self.reader.malformed(&format!("gluon flag must be 0, 1, or 2, found {val}")))
        }
    }

    fn read_muon_pair(&mut self) -> Result<[f64; 5]> {
        let mu1 = self.read_muon_line()?;
        if !self.advance()? {
            return Err(Error::UnexpectedEof { context: "after first muon line".into() });
        }
        let mu2 = self.read_muon_line()?;

        let mut z = [0.0; 5];
        for i in 0..4 {
            z[i] = mu1[i] + mu2[i];
        }
        // rapidity from energy z[3] and longitudinal momentum z[2]
        z[4] = 0.5 * ((z[3] + z[2]) / (z[3] - z[2])).ln();
        Ok(z)
    }

    fn read_muon_line(&mut self) -> Result<[f64; 4]> {
        self.reader.skip_char('M')?;
        let mut mu = [0.0; 4];
        for v in &mut mu {
            *v = self.reader.read_f64()?;
        }
        Ok(mu)
    }
}
