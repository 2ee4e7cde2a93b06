use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "lockfree-bitset workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bitset benchmark under every global allocator
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

const BENCH: &str = "atomic_bitset_benchmark";

const ALLOCATORS: &[&str] = &[
    "alloc-system",
    "alloc-mimalloc",
    "alloc-snmalloc",
    "alloc-jemalloc",
];

/// `target/criterion/<group>/<function>/<baseline>/estimates.json`
#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

/// `target/criterion/<group>/<function>/<baseline>/benchmark.json`
#[derive(Deserialize)]
struct BenchmarkInfo {
    full_id: String,
    #[serde(default)]
    throughput: Option<Throughput>,
}

#[derive(Deserialize)]
enum Throughput {
    Elements(u64),
    Bytes(u64),
    BytesDecimal(u64),
}

/// workload id -> allocator -> ops/s
type Results = BTreeMap<String, HashMap<String, f64>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn baseline_name(feature: &str) -> String {
    feature.replace("alloc-", "")
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Compiling {BENCH}...");
    let status = Command::new("cargo")
        .args(["build", "--bench", BENCH, "--release"])
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    for alloc in ALLOCATORS {
        println!("\n>>> Benchmarking with feature: {alloc}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .args(["bench", "--bench", BENCH, "--features", alloc])
            .arg("--")
            .arg("--save-baseline")
            .arg(baseline_name(alloc));

        if quick {
            cmd.args(["--measurement-time", "0.1", "--sample-size", "10", "--noplot"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench for {alloc}"))?;

        if status.success() {
            println!("Finished {alloc} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for {alloc}");
        }
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("creating {}", report_path.display()))?;

    writeln!(file, "# AtomicBitset Allocator Comparison")?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for alloc in ALLOCATORS {
        write!(file, " {} (Ops/s) | vs System |", baseline_name(alloc))?;
    }
    writeln!(file)?;

    write!(file, "|---|")?;
    for _ in ALLOCATORS {
        write!(file, "---|---|")?;
    }
    writeln!(file)?;

    for (workload, by_alloc) in &results {
        write!(file, "| {workload} |")?;
        let system_ops = by_alloc.get("system").copied().unwrap_or(0.0);

        for alloc in ALLOCATORS {
            match by_alloc.get(&baseline_name(alloc)) {
                Some(ops) => {
                    let rel = if system_ops > 0.0 { ops / system_ops } else { 0.0 };
                    write!(file, " {} | **{rel:.2}x** |", format_ops(*ops))?;
                }
                None => write!(file, " N/A | - |")?,
            }
        }
        writeln!(file)?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

fn collect_results(dir: &Path, results: &mut Results) -> Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else {
            continue;
        };
        let Some(baseline) = baseline_dir.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !ALLOCATORS.iter().any(|a| baseline_name(a) == baseline) {
            continue;
        }

        let info: BenchmarkInfo = read_json(&baseline_dir.join("benchmark.json"))?;
        let estimates: Estimates = read_json(&path)?;
        let time_ns = estimates.mean.point_estimate;
        if time_ns <= 0.0 {
            continue;
        }

        let elements = match info.throughput {
            Some(Throughput::Elements(n) | Throughput::Bytes(n) | Throughput::BytesDecimal(n)) => {
                n as f64
            }
            None => 1.0,
        };
        results
            .entry(info.full_id)
            .or_default()
            .insert(baseline.to_string(), elements * 1e9 / time_ns);
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
