use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cutflow"))
}

fn tmp_path(filename: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("cutflow_cli_{}_{}_{}", std::process::id(), nanos, filename));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

// Two events in the 16-column "newer" layout: raw jet lines carry
// VAR_NUM, VAR_PT, VAR_PSEUDORAP, VAR_PHI, VAR_M, VAR_CONST, VAR_RAP,
// VAR_CONST_SD.
const EVENTS: &str = "\
generated by simulation vX
New Event
0.5, 1.25
1, 160, 0.1, 0.2, 30, 50, 1.0, 5
2, 100, 0.1, 0.2, 30, 50, 1.0, 5
New Event
1.5, 2.5
H 1 2 3 4 5 6 1 0
3, 170, 0.0, 0.3, 20, 40, -1.0, 4
";

const SPEC: &str = "\
takeNum: 2
skipNum: 0
strict: false
eventProbabilityMultiplier: nan
randomSeed: 0

new_cut
VAR_PT 150 175
histogram_ints: VAR_NUM
histogram: VAR_PT 150 175 5
";

fn write_fixtures(tag: &str) -> (PathBuf, PathBuf) {
    let events = tmp_path(&format!("{tag}_events.txt"));
    let spec = tmp_path(&format!("{tag}_spec.txt"));
    std::fs::write(&events, EVENTS).unwrap();
    std::fs::write(&spec, SPEC).unwrap();
    (events, spec)
}

#[test]
fn text_report() {
    let (events, spec) = write_fixtures("text");
    let out = run(&[
        events.to_str().unwrap(),
        "--spec",
        spec.to_str().unwrap(),
        "--no-progress",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    // csOnW = 2.5 / (0.5 + 1.5)
    assert!(stdout.starts_with("1.250000\n"), "stdout: {stdout}");
    assert!(stdout.contains("----------------------------------\n"));
    assert!(stdout.contains("VAR_NUM\n"));
    // masses: jet VAR_NUM=1 carries 0.5 of 2.0, VAR_NUM=3 carries 1.5
    assert!(stdout.contains("1: 0.250000 err"), "stdout: {stdout}");
    assert!(stdout.contains("3: 0.750000 err"), "stdout: {stdout}");
    // jet with VAR_PT=100 fails the cut
    assert!(!stdout.contains("2: "), "stdout: {stdout}");

    std::fs::remove_file(events).unwrap();
    std::fs::remove_file(spec).unwrap();
}

#[test]
fn json_report() {
    let (events, spec) = write_fixtures("json");
    let out = run(&[
        events.to_str().unwrap(),
        "--spec",
        spec.to_str().unwrap(),
        "--json",
        "--no-progress",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["cs_on_w"].as_f64().unwrap(), 1.25);
    assert_eq!(v["total_weight"].as_f64().unwrap(), 2.0);
    assert_eq!(v["num_events"].as_u64().unwrap(), 2);

    let cut = &v["cut_results"][0];
    assert_eq!(cut["total_jets_taken"].as_u64().unwrap(), 2);
    let hists = cut["histograms"].as_array().unwrap();
    assert_eq!(hists.len(), 2);
    assert_eq!(hists[0]["kind"], "ints");
    assert_eq!(hists[1]["kind"], "bins");
    // VAR_PT=160 lands in [160, 165): density 0.5 / (5 * 2.0)
    assert_eq!(hists[1]["bin_sums"][2].as_f64().unwrap(), 0.05);

    std::fs::remove_file(events).unwrap();
    std::fs::remove_file(spec).unwrap();
}

#[test]
fn output_file() {
    let (events, spec) = write_fixtures("outfile");
    let outfile = tmp_path("result.txt");
    let out = run(&[
        events.to_str().unwrap(),
        "--spec",
        spec.to_str().unwrap(),
        "--output",
        outfile.to_str().unwrap(),
        "--no-progress",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());

    let text = std::fs::read_to_string(&outfile).unwrap();
    assert!(text.starts_with("1.250000\n"));

    std::fs::remove_file(events).unwrap();
    std::fs::remove_file(spec).unwrap();
    std::fs::remove_file(outfile).unwrap();
}

#[test]
fn malformed_input_fails_with_context() {
    let events = tmp_path("bad_events.txt");
    let spec = tmp_path("bad_spec.txt");
    std::fs::write(&events, "header\nNot An Event\n").unwrap();
    std::fs::write(&spec, SPEC).unwrap();

    let out = run(&[
        events.to_str().unwrap(),
        "--spec",
        spec.to_str().unwrap(),
        "--no-progress",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("New Event"), "stderr: {stderr}");

    std::fs::remove_file(events).unwrap();
    std::fs::remove_file(spec).unwrap();
}

#[test]
fn bad_spec_fails_before_the_scan() {
    let events = tmp_path("badspec_events.txt");
    std::fs::write(&events, EVENTS).unwrap();
    let spec = tmp_path("unknown_var_spec.txt");
    std::fs::write(
        &spec,
        "takeNum: 1\nskipNum: 0\nstrict: false\neventProbabilityMultiplier: nan\n\
         randomSeed: 0\nnew_cut\nVAR_NOPE 0 1\nhistogram_ints: VAR_NUM\n",
    )
    .unwrap();

    let out = run(&[
        events.to_str().unwrap(),
        "--spec",
        spec.to_str().unwrap(),
        "--no-progress",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("VAR_NOPE"));

    std::fs::remove_file(events).unwrap();
    std::fs::remove_file(spec).unwrap();
}
