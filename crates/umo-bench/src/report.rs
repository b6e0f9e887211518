//! JSONL artifacts, per-case summaries and run-to-run deltas.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Bumped whenever a [`BenchRecord`] field changes meaning.
pub const SCHEMA_VERSION: u32 = 2;

const MIB: f64 = 1024.0 * 1024.0;

/// One stage of one repetition, one JSON object per artifact line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchRecord {
    pub schema_version: u32,
    pub run_id: String,
    pub scenario: String,
    /// Requested node count; `nodes` is what the builder produced.
    pub size: usize,
    pub repetition: u32,
    pub nodes: usize,
    pub variables: usize,
    pub stage: String,
    pub elapsed_ms: f64,
    pub rss_before_bytes: Option<u64>,
    pub rss_after_bytes: Option<u64>,
    pub rss_growth_bytes: Option<i64>,
}

type CaseKey = (String, usize, String);

impl BenchRecord {
    fn case_key(&self) -> CaseKey {
        (self.scenario.clone(), self.size, self.stage.clone())
    }
}

/// Repetitions of one `(scenario, size, stage)` folded together.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub scenario: String,
    pub size: usize,
    pub stage: String,
    pub runs: usize,
    pub mean_ms: f64,
    pub worst_ms: f64,
    pub mean_rss_growth_bytes: Option<f64>,
    pub peak_rss_bytes: Option<u64>,
}

impl Summary {
    fn case_key(&self) -> CaseKey {
        (self.scenario.clone(), self.size, self.stage.clone())
    }
}

#[derive(Default)]
struct Tally {
    runs: usize,
    total_ms: f64,
    worst_ms: f64,
    growth: Vec<i64>,
    peak_rss: Option<u64>,
}

impl Tally {
    fn add(&mut self, record: &BenchRecord) {
        self.runs += 1;
        self.total_ms += record.elapsed_ms;
        self.worst_ms = self.worst_ms.max(record.elapsed_ms);
        self.growth.extend(record.rss_growth_bytes);
        self.peak_rss = self.peak_rss.max(record.rss_after_bytes);
    }

    fn into_summary(self, (scenario, size, stage): CaseKey) -> Summary {
        let mean_rss_growth_bytes = (!self.growth.is_empty()).then(|| {
            let sum: f64 = self.growth.iter().map(|&bytes| bytes as f64).sum();
            sum / self.growth.len() as f64
        });
        Summary {
            scenario,
            size,
            stage,
            runs: self.runs,
            mean_ms: self.total_ms / self.runs.max(1) as f64,
            worst_ms: self.worst_ms,
            mean_rss_growth_bytes,
            peak_rss_bytes: self.peak_rss,
        }
    }
}

/// Summaries sorted by scenario, then size, then stage name.
pub fn summarize(records: &[BenchRecord]) -> Vec<Summary> {
    let mut tallies: BTreeMap<CaseKey, Tally> = BTreeMap::new();
    for record in records {
        tallies.entry(record.case_key()).or_default().add(record);
    }
    tallies
        .into_iter()
        .map(|(key, tally)| tally.into_summary(key))
        .collect()
}

/// Candidate against baseline for one case present in both artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct Delta {
    pub scenario: String,
    pub size: usize,
    pub stage: String,
    pub baseline_ms: f64,
    pub candidate_ms: f64,
    pub time_change_pct: Option<f64>,
    pub baseline_rss_growth_bytes: Option<f64>,
    pub candidate_rss_growth_bytes: Option<f64>,
    pub rss_change_pct: Option<f64>,
}

/// Relative change in percent; undefined against a zero baseline.
fn relative_change(before: f64, after: f64) -> Option<f64> {
    (before != 0.0).then(|| (after - before) / before.abs() * 100.0)
}

/// Join both summaries on their case, keeping only `stage`.
pub fn diff(baseline: &[Summary], candidate: &[Summary], stage: &str) -> Vec<Delta> {
    let before: BTreeMap<CaseKey, &Summary> = baseline
        .iter()
        .filter(|summary| summary.stage == stage)
        .map(|summary| (summary.case_key(), summary))
        .collect();

    let mut deltas = Vec::new();
    for after in candidate.iter().filter(|summary| summary.stage == stage) {
        let Some(base) = before.get(&after.case_key()) else {
            continue;
        };
        let rss_change_pct = base
            .mean_rss_growth_bytes
            .zip(after.mean_rss_growth_bytes)
            .and_then(|(old, new)| relative_change(old, new));
        deltas.push(Delta {
            scenario: after.scenario.clone(),
            size: after.size,
            stage: after.stage.clone(),
            baseline_ms: base.mean_ms,
            candidate_ms: after.mean_ms,
            time_change_pct: relative_change(base.mean_ms, after.mean_ms),
            baseline_rss_growth_bytes: base.mean_rss_growth_bytes,
            candidate_rss_growth_bytes: after.mean_rss_growth_bytes,
            rss_change_pct,
        });
    }
    deltas
}

/// Allowed slowdown and memory growth, in percent. Unset limits never trip.
#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct Limits {
    /// Fail when mean stage time grows by more than this percentage
    #[arg(long = "duration-threshold-pct")]
    pub time_pct: Option<f64>,

    /// Fail when mean RSS growth rises by more than this percentage
    #[arg(long = "memory-threshold-pct")]
    pub rss_pct: Option<f64>,
}

impl Limits {
    fn exceeded(limit: Option<f64>, change: Option<f64>) -> bool {
        matches!((limit, change), (Some(limit), Some(change)) if change > limit)
    }

    /// Deltas breaking at least one limit.
    pub fn violations<'a>(&self, deltas: &'a [Delta]) -> Vec<&'a Delta> {
        deltas
            .iter()
            .filter(|delta| {
                Self::exceeded(self.time_pct, delta.time_change_pct)
                    || Self::exceeded(self.rss_pct, delta.rss_change_pct)
            })
            .collect()
    }
}

fn mib(bytes: Option<f64>) -> String {
    bytes.map_or_else(|| "-".into(), |b| format!("{:.3}", b / MIB))
}

fn pct(change: Option<f64>) -> String {
    change.map_or_else(|| "-".into(), |c| format!("{c:+.2}"))
}

/// Fixed-width text rendering of summaries.
pub struct SummaryTable<'a>(pub &'a [Summary]);

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:>9} {:<11} {:>5} {:>11} {:>11} {:>13} {:>12}",
            "scenario", "size", "stage", "runs", "mean ms", "worst ms", "rss growth MiB", "peak MiB"
        )?;
        for s in self.0 {
            writeln!(
                f,
                "{:<8} {:>9} {:<11} {:>5} {:>11.3} {:>11.3} {:>13} {:>12}",
                s.scenario,
                s.size,
                s.stage,
                s.runs,
                s.mean_ms,
                s.worst_ms,
                mib(s.mean_rss_growth_bytes),
                mib(s.peak_rss_bytes.map(|bytes| bytes as f64)),
            )?;
        }
        Ok(())
    }
}

/// Fixed-width text rendering of deltas.
pub struct DeltaTable<'a>(pub &'a [Delta]);

impl fmt::Display for DeltaTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:>9} {:<11} {:>11} {:>11} {:>8} {:>11} {:>11} {:>8}",
            "scenario", "size", "stage", "base ms", "cand ms", "time %", "base MiB", "cand MiB", "rss %"
        )?;
        for d in self.0 {
            writeln!(
                f,
                "{:<8} {:>9} {:<11} {:>11.3} {:>11.3} {:>8} {:>11} {:>11} {:>8}",
                d.scenario,
                d.size,
                d.stage,
                d.baseline_ms,
                d.candidate_ms,
                pct(d.time_change_pct),
                mib(d.baseline_rss_growth_bytes),
                mib(d.candidate_rss_growth_bytes),
                pct(d.rss_change_pct),
            )?;
        }
        Ok(())
    }
}

/// Write `rows` as JSON lines, creating parent directories as needed.
pub fn save_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut out = std::io::BufWriter::new(fs::File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Parse a JSONL file, skipping blank lines. Errors name the 1-based line.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|err| -> Box<dyn Error> {
                format!("{}:{}: {err}", path.display(), idx + 1).into()
            })
        })
        .collect()
}
