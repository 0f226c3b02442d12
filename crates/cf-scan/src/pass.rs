//! The single forward pass: event acceptance, jet assembly, cut
//! evaluation, and histogram accumulation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::Serialize;

use cf_core::{Cut, Error, Format, Histogram, Jet, Result};

use crate::event::{EventParser, EventRecord, GLUON_FLAG_UNKNOWN};
use crate::line_reader::LineReader;
use crate::progress::Progress;

/// Global jet-traversal and sampling policy plus the active cuts.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    /// Maximum matching jets kept per event, per cut.
    pub take_num: usize,
    /// Leading jets of every event that are never tested.
    pub skip_num: usize,
    /// If set, stop considering jets once `skip_num + take_num` have been
    /// seen, whether or not any cut was satisfied.
    pub strict: bool,
    /// Probabilistic event down-sampling multiplier; NaN disables
    /// sampling and events contribute their raw weight.
    pub event_probability_multiplier: f64,
    /// Seed for the sampling draw sequence.
    pub random_seed: i64,
    /// The cuts to test every jet against.
    pub cuts: Vec<Cut>,
}

/// Accumulated results for one cut.
#[derive(Debug, Clone, Serialize)]
pub struct CutResult {
    /// Jets accepted by this cut over the whole pass.
    pub total_jets_taken: usize,
    /// This cut's histograms, finalized after the pass.
    pub histograms: Vec<Histogram>,
}

impl CutResult {
    fn add(&mut self, weight: f64, jet: &Jet) -> Result<()> {
        self.total_jets_taken += 1;
        for hist in &mut self.histograms {
            hist.add(weight, jet)?;
        }
        Ok(())
    }

    fn finish(&mut self) {
        for hist in &mut self.histograms {
            hist.finish();
        }
    }
}

/// Results of a complete pass over one event log.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Last-read cross-section sample divided by the accumulated total
    /// weight. Non-finite when no event was accepted.
    pub cs_on_w: f64,
    /// Sum of accepted events' weights.
    pub total_weight: f64,
    /// Number of accepted events.
    pub num_events: u64,
    /// Per-cut accumulations, in spec order.
    pub cut_results: Vec<CutResult>,
}

/// Run the full pass over a buffered event log.
///
/// The sampling draw sequence is ChaCha12 seeded from `random_seed`,
/// one `[0, 1)` draw per event while sampling is enabled; any
/// reimplementation must reproduce it bit-for-bit to cross-validate.
pub fn scan<R: BufRead>(
    format: &Format,
    reader: LineReader<R>,
    spec: &ScanSpec,
) -> Result<ScanResult> {
    let use_event_probability = !spec.event_probability_multiplier.is_nan();
    let mut rng = ChaCha12Rng::seed_from_u64(spec.random_seed as u64);

    let mut result = ScanResult {
        cs_on_w: f64::NAN,
        total_weight: 0.0,
        num_events: 0,
        cut_results: spec
            .cuts
            .iter()
            .map(|cut| CutResult { total_jets_taken: 0, histograms: cut.histograms.clone() })
            .collect(),
    };

    // Kept across events so the last accepted sample survives to the end.
    let mut cross_section = f64::NAN;
    let mut parser = EventParser::new(reader)?;
    let mut raw: Vec<f64> = Vec::with_capacity(format.num_vars());

    while let Some(event) = parser.next_event()? {
        let keep_event = !use_event_probability
            || rng.random::<f64>() < event.weight * spec.event_probability_multiplier;

        if keep_event {
            result.num_events += 1;
            result.total_weight += event.weight;
            cross_section = event.cross_section;
        }

        // A sampled event contributes unweighted.
        let effective_weight = if use_event_probability { 1.0 } else { event.weight };

        let mut jets_seen = 0usize;
        let mut jets_taken = vec![0usize; spec.cuts.len()];

        while parser.has_jet()? {
            if !keep_event {
                parser.skip_jet_line()?;
                continue;
            }
            jets_seen += 1;
            if jets_seen <= spec.skip_num {
                parser.skip_jet_line()?;
                continue;
            }
            if jets_taken.iter().all(|&taken| taken >= spec.take_num) {
                parser.skip_jet_line()?;
                continue;
            }
            if spec.strict && jets_seen > spec.skip_num + spec.take_num {
                parser.skip_jet_line()?;
                continue;
            }

            parser.read_jet(&mut raw)?;
            let jet = assemble_row(format, &raw, effective_weight, &event)?;

            for (i, cut) in spec.cuts.iter().enumerate() {
                if jets_taken[i] >= spec.take_num {
                    continue;
                }
                if cut.matches(&jet)? {
                    jets_taken[i] += 1;
                    result.cut_results[i].add(effective_weight, &jet)?;
                }
            }
        }
    }

    result.cs_on_w = cross_section / result.total_weight;
    for cut_result in &mut result.cut_results {
        cut_result.finish();
    }
    Ok(result)
}

/// Open `path` and run the full pass, optionally with a progress bar.
pub fn scan_path(
    format: &Format,
    path: &Path,
    spec: &ScanSpec,
    progress: bool,
) -> Result<ScanResult> {
    let file = File::open(path)?;
    let total_bytes = file.metadata()?.len();
    let progress = if progress {
        Progress::new(&path.display().to_string(), total_bytes)
    } else {
        Progress::hidden()
    };
    let reader = LineReader::new(BufReader::new(file), progress);
    scan(format, reader, spec)
}

/// Splice the event-level quantities into a raw jet line, producing a
/// full row in column-layout order.
fn assemble_row(
    format: &Format,
    raw: &[f64],
    effective_weight: f64,
    event: &EventRecord,
) -> Result<Jet> {
    if raw.len() != format.num_raw_vars() {
        return Err(Error::JetLength {
            expected: format.num_vars(),
            actual: raw.len() + cf_core::SPLICED_COLS,
        });
    }

    let (g1, g2) = match event.gluon_flags {
        Some((g1, g2)) => (f64::from(g1), f64::from(g2)),
        None => (GLUON_FLAG_UNKNOWN, GLUON_FLAG_UNKNOWN),
    };
    let z = event.z_frame.unwrap_or([f64::INFINITY; 5]);

    let mut jet: Jet = raw.to_vec();
    jet.insert(format.weight_insert(), effective_weight);
    for (k, &component) in z.iter().enumerate() {
        jet.insert(format.z_insert() + k, component);
    }
    jet.insert(format.flag_insert(), g1);
    jet.insert(format.flag_insert() + 1, g2);

    if jet.len() != format.num_vars() {
        return Err(Error::JetLength { expected: format.num_vars(), actual: jet.len() });
    }
    Ok(jet)
}
