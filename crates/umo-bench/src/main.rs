mod measure;
mod report;
mod scenario;

use std::error::Error;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::report::{
    BenchRecord, DeltaTable, Limits, SCHEMA_VERSION, SummaryTable, diff, read_jsonl, save_jsonl,
    summarize,
};
use crate::scenario::{CaseRun, Scenario, run_case};

type CliResult = Result<(), Box<dyn Error>>;

const DEFAULT_SIZES: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

/// Time UMO graph construction, evaluation and auditing on synthetic graphs.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// Tracing filter directive; takes precedence over UMO_TRACE
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build graphs, time every stage and write a JSONL artifact
    Run(RunArgs),
    /// Summarize a previously written artifact
    Report {
        /// Artifact to read
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Diff a candidate artifact against a baseline
    Compare(CompareArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Graph shapes, comma separated
    #[arg(long = "scenario", value_enum, value_delimiter = ',', default_value = "chain")]
    scenarios: Vec<Scenario>,

    /// Target node counts, comma separated
    #[arg(long, value_delimiter = ',')]
    cases: Option<Vec<usize>>,

    /// Shorthand for a single target node count
    #[arg(long, conflicts_with = "cases")]
    nodes: Option<usize>,

    /// Times each case is rebuilt from scratch
    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// Artifact path [default: artifacts/bench/<run id>.jsonl]
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "table")]
    format: Format,
}

impl RunArgs {
    fn sizes(&self) -> Vec<usize> {
        match (&self.nodes, &self.cases) {
            (Some(nodes), _) => vec![*nodes],
            (None, Some(cases)) => cases.clone(),
            (None, None) => DEFAULT_SIZES.to_vec(),
        }
    }
}

#[derive(clap::Args, Debug)]
struct CompareArgs {
    #[arg(long)]
    baseline: PathBuf,

    #[arg(long)]
    candidate: PathBuf,

    /// Only rows of this stage are joined
    #[arg(long, default_value = "total")]
    stage: String,

    #[command(flatten)]
    limits: Limits,

    #[arg(long, value_enum, default_value = "table")]
    format: Format,
}

/// How rows are printed on stdout.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Format {
    /// Aligned text columns
    Table,
    /// One pretty-printed JSON array
    Json,
    /// One JSON object per line
    Ndjson,
}

impl Format {
    fn print<T: Serialize>(self, rows: &[T], table: impl std::fmt::Display) -> CliResult {
        match self {
            Format::Table => print!("{table}"),
            Format::Json => println!("{}", serde_json::to_string_pretty(rows)?),
            Format::Ndjson => {
                for row in rows {
                    println!("{}", serde_json::to_string(row)?);
                }
            }
        }
        Ok(())
    }
}

fn main() {
    if let Err(err) = dispatch(Cli::parse()) {
        eprintln!("umo-bench: {err}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> CliResult {
    umo_core::enable_logging(cli.log_level.as_deref())?;
    match cli.command {
        Command::Run(args) => run(args),
        Command::Report { input, format } => {
            let records: Vec<BenchRecord> = read_jsonl(&input)?;
            format.print(&records, SummaryTable(&summarize(&records)))
        }
        Command::Compare(args) => compare(args),
    }
}

fn run(args: RunArgs) -> CliResult {
    if args.repetitions == 0 {
        return Err("--repetitions must be at least 1".into());
    }
    let sizes = args.sizes();
    if sizes.contains(&0) {
        return Err("node counts must be positive".into());
    }

    let started = SystemTime::now().duration_since(UNIX_EPOCH)?;
    let run_id = format!("bench_{}", started.as_millis());
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("artifacts/bench").join(format!("{run_id}.jsonl")));

    let mut records = Vec::new();
    for &scenario in &args.scenarios {
        for &size in &sizes {
            for repetition in 1..=args.repetitions {
                let case = run_case(scenario, size)?;
                records.extend(to_records(&run_id, scenario, size, repetition, &case));
            }
        }
    }

    save_jsonl(&output, &records)?;
    args.format.print(&records, SummaryTable(&summarize(&records)))?;
    println!("artifact: {}", output.display());
    Ok(())
}

fn compare(args: CompareArgs) -> CliResult {
    let baseline: Vec<BenchRecord> = read_jsonl(&args.baseline)?;
    let candidate: Vec<BenchRecord> = read_jsonl(&args.candidate)?;
    let deltas = diff(&summarize(&baseline), &summarize(&candidate), &args.stage);
    if deltas.is_empty() {
        return Err(format!("the artifacts share no cases at stage `{}`", args.stage).into());
    }

    args.format.print(&deltas, DeltaTable(&deltas))?;
    let violations = args.limits.violations(&deltas);
    if !violations.is_empty() {
        return Err(format!("{} case(s) exceed the configured limits", violations.len()).into());
    }
    Ok(())
}

fn to_records(
    run_id: &str,
    scenario: Scenario,
    size: usize,
    repetition: u32,
    case: &CaseRun,
) -> Vec<BenchRecord> {
    case.samples
        .iter()
        .map(|sample| BenchRecord {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.to_owned(),
            scenario: scenario.as_str().to_owned(),
            size,
            repetition,
            nodes: case.nodes,
            variables: case.variables,
            stage: sample.stage.to_owned(),
            elapsed_ms: sample.elapsed.as_secs_f64() * 1e3,
            rss_before_bytes: sample.rss_before,
            rss_after_bytes: sample.rss_after,
            rss_growth_bytes: sample.rss_growth(),
        })
        .collect()
}
