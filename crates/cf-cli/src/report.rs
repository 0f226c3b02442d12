//! Text rendering of finalized scan results.

use cf_core::Histogram;
use cf_scan::ScanResult;

/// Render the result the way the batch tooling expects: the csOnW ratio,
/// then per cut a separator and one block per histogram.
pub fn render(result: &ScanResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:.6}\n", result.cs_on_w));
    for cut_result in &result.cut_results {
        out.push_str("----------------------------------\n");
        for hist in &cut_result.histograms {
            out.push_str(&format!("{}\n", hist.var_name()));
            match hist {
                Histogram::Ints(h) => {
                    for (key, mass) in &h.bin_sums {
                        out.push_str(&format!("{}: {:.6} err {:.6}\n", key, mass, h.bin_errs[key]));
                    }
                }
                Histogram::Bins(h) => {
                    for i in 0..h.bin_sums.len() {
                        out.push_str(&format!(
                            "{:.6}-{:.6}: {:.6} err {:.6}\n",
                            h.bin_endpoints[i],
                            h.bin_endpoints[i + 1],
                            h.bin_sums[i],
                            h.bin_errs[i]
                        ));
                    }
                }
            }
        }
    }
    out
}
