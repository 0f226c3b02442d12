//! Byte-driven progress reporting for the file scan.

use indicatif::{ProgressBar, ProgressStyle};

/// Stderr progress bar fed by the bytes consumed per line read.
///
/// Purely observational: it never affects parsing. A hidden variant is
/// used for non-file inputs and for `--no-progress`.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Create a visible progress bar for `total_bytes` of input.
    pub fn new(name: &str, total_bytes: u64) -> Self {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:60}] {percent}% ({bytes_per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("= "),
        );
        bar.set_message(name.to_string());
        Self { bar }
    }

    /// Create a no-op progress reporter.
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// Record `n` more bytes consumed from the input.
    pub fn add_bytes_read(&self, n: u64) {
        self.bar.inc(n);
    }

    /// Stop reporting and print the final timing line.
    pub fn finish(&self) {
        self.bar.finish();
    }
}
