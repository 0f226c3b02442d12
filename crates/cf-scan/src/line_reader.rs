//! Bounded line reader with in-line token parsing.
//!
//! Reads the input one line at a time and parses values out of the most
//! recently read line through a cursor. A line longer than
//! [`MAX_LINE_LENGTH`] is a distinct fatal error, separate from ordinary
//! malformed content.

use std::io::{BufRead, Read};

use cf_core::{Error, Result};

use crate::progress::Progress;

/// Longest accepted input line, excluding the newline.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Line-by-line reader over any buffered input.
pub struct LineReader<R> {
    input: R,
    buf: String,
    pos: usize,
    line_num: u64,
    at_eof: bool,
    progress: Progress,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered input, reporting bytes read to `progress`.
    pub fn new(input: R, progress: Progress) -> Self {
        Self { input, buf: String::new(), pos: 0, line_num: 0, at_eof: false, progress }
    }

    /// Load the next line. Returns `Ok(false)` at end of input.
    pub fn next_line(&mut self) -> Result<bool> {
        self.buf.clear();
        self.pos = 0;
        let mut limited = (&mut self.input).take(MAX_LINE_LENGTH as u64 + 1);
        let n = limited.read_line(&mut self.buf)?;
        if n == 0 {
            self.at_eof = true;
            self.progress.finish();
            return Ok(false);
        }
        self.line_num += 1;
        self.progress.add_bytes_read(n as u64);
        if self.buf.ends_with('\n') {
            self.buf.pop();
            if self.buf.ends_with('\r') {
                self.buf.pop();
            }
        } else if n > MAX_LINE_LENGTH {
            return Err(Error::LineTooLong { line: self.line_num, max: MAX_LINE_LENGTH });
        }
        Ok(true)
    }

    /// 1-based number of the current line.
    pub fn line_num(&self) -> u64 {
        self.line_num
    }

    /// True if the last `next_line` call reached the end of the input.
    pub fn at_eof(&self) -> bool {
        self.at_eof
    }

    /// True if every character of the current line has been consumed.
    pub fn used_whole_line(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Construct a malformed-content error at the current line.
    pub fn malformed(&self, context: &str) -> Error {
        Error::Malformed { line: self.line_num, context: context.to_string() }
    }

    fn rest(&self) -> &str {
        &self.buf[self.pos..]
    }

    /// Next character of the current line, without consuming it.
    pub fn peek(&self) -> Result<char> {
        self.rest().chars().next().ok_or_else(|| self.malformed("read past end of line"))
    }

    /// Validate that the rest of the line is exactly `literal`, and
    /// consume it.
    pub fn skip(&mut self, literal: &str) -> Result<()> {
        if self.rest() == literal {
            self.pos = self.buf.len();
            Ok(())
        } else {
            Err(self.malformed(&format!("expected {literal:?}")))
        }
    }

    /// Validate that `c` appears next on the line, and consume it.
    pub fn skip_char(&mut self, c: char) -> Result<()> {
        match self.rest().chars().next() {
            Some(got) if got == c => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(got) => Err(self.malformed(&format!("expected {c:?}, found {got:?}"))),
            None => Err(self.malformed("read past end of line")),
        }
    }

    /// Consume any whitespace at the cursor.
    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Skip whitespace and consume the next floating-point value.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = float_token_len(rest);
        if len == 0 {
            let token: String = rest.chars().take(16).collect();
            return Err(Error::InvalidNumber { line: self.line_num, token });
        }
        let token = &rest[..len];
        let val = token.parse::<f64>().map_err(|_| Error::InvalidNumber {
            line: self.line_num,
            token: token.to_string(),
        })?;
        self.pos += len;
        Ok(val)
    }

    /// Consume comma-and-whitespace-separated values until the end of the
    /// current line.
    pub fn read_comma_separated(&mut self, out: &mut Vec<f64>) -> Result<()> {
        loop {
            out.push(self.read_f64()?);
            self.skip_whitespace();
            if self.used_whole_line() {
                return Ok(());
            }
            self.skip_char(',')?;
        }
    }
}

/// Length of the longest prefix of `s` that reads as a decimal float
/// (optionally signed, with fraction and exponent).
fn float_token_len(s: &str) -> usize {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let mut digits = 0;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && matches!(b[j], b'+' | b'-') {
            j += 1;
        }
        let mut exp_digits = 0;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
            exp_digits += 1;
        }
        if exp_digits > 0 {
            i = j;
        }
    }
    i
}
