//! cutflow CLI

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use cf_core::Format;

mod report;
mod spec;

#[derive(Parser)]
#[command(name = "cutflow")]
#[command(about = "cutflow - weighted jet selection and histogramming over collision event logs")]
#[command(version)]
struct Cli {
    /// Input event log
    input: PathBuf,

    /// Column layout of the input file
    #[arg(long, value_enum, default_value = "newer")]
    format: FormatArg,

    /// Selection spec file. Defaults to stdin.
    #[arg(short, long)]
    spec: Option<PathBuf>,

    /// Emit results as pretty JSON instead of text
    #[arg(long)]
    json: bool,

    /// Output file for results. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// 23-column layout with correlation and angularity variables
    New,
    /// 16-column layout
    Newer,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    let format = match cli.format {
        FormatArg::New => Format::with_angularities(),
        FormatArg::Newer => Format::newer(),
    };

    let spec_text = match &cli.spec {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading spec {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading spec from stdin")?;
            text
        }
    };
    let spec = spec::parse_spec(&format, &spec_text)?;
    tracing::info!(cuts = spec.cuts.len(), take_num = spec.take_num, "spec loaded");

    let result = cf_scan::scan_path(&format, &cli.input, &spec, !cli.no_progress)
        .with_context(|| format!("scanning {}", cli.input.display()))?;
    tracing::info!(
        events = result.num_events,
        total_weight = result.total_weight,
        cs_on_w = result.cs_on_w,
        "scan complete"
    );

    let rendered = if cli.json {
        let mut json = serde_json::to_string_pretty(&result)?;
        json.push('\n');
        json
    } else {
        report::render(&result)
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
