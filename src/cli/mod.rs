//! CLI argument parsing and command handling

mod run_file;

use run_file::{RunFile, RunOverrides, RunSettings, DEFAULT_BASE_URL};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use vrp_bench_core::{
    BenchmarkRunState, DemoDataset, OrchestratorBuilder, ProblemSource, RunPhase,
    SessionOutcome, SolveSession,
};
use vrp_bench_report::{
    iteration_details, results_table, solve_summary, statistics_block, write_markdown,
    ArchiveDocument, CsvExporter,
};
use vrp_bench_vendors::{HttpConfig, TimefoldClient};

use crate::presenter::ConsolePresenter;

fn rule() -> String {
    "=".repeat(70)
}

/// vrp-bench - consistency benchmark for remote vehicle-routing solvers
#[derive(Parser, Debug)]
#[command(name = "vrp-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the solver service [default: http://localhost:8080]
    #[arg(short, long, global = true, env = "VRP_BENCH_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an iterative benchmark
    Run {
        /// Path to a TOML run file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of iterations (3, 5, 7 or 10)
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Demo dataset, e.g. SINGAPORE_WIDE
        #[arg(short, long)]
        dataset: Option<String>,

        /// Output directory for results
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Solve a demo dataset once and show timings
    Solve {
        /// Demo dataset, e.g. SINGAPORE_WIDE
        #[arg(short, long, default_value = "SINGAPORE_WIDE")]
        dataset: String,

        /// Write the solution as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds between status refreshes
        #[arg(long, default_value = "2")]
        refresh: u64,
    },
    /// Re-display a saved run
    Report {
        /// Path to a results.json written by `run`
        #[arg(short, long)]
        input: PathBuf,

        /// Show the details of one iteration
        #[arg(long)]
        iteration: Option<usize>,
    },
    /// Validate a run file
    Validate {
        /// Path to a TOML run file
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Cli {
    /// Dispatch the selected subcommand
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Run {
                config,
                iterations,
                dataset,
                output_dir,
                timeout,
            } => {
                let file = match config {
                    Some(path) => RunFile::load(path)?,
                    None => RunFile::default(),
                };
                let overrides = RunOverrides {
                    iterations: *iterations,
                    dataset: dataset.clone(),
                    output_dir: output_dir.clone(),
                    request_timeout_secs: *timeout,
                };
                let settings = RunSettings::resolve(self.base_url.as_deref(), file, overrides)?;
                run_benchmark(settings).await
            }
            Commands::Solve {
                dataset,
                output,
                refresh,
            } => {
                let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
                let dataset: DemoDataset = dataset.parse()?;
                solve_once(base_url, dataset, output.as_deref(), *refresh).await
            }
            Commands::Report { input, iteration } => show_report(input, *iteration),
            Commands::Validate { config } => validate_run_file(config),
        }
    }
}

async fn run_benchmark(settings: RunSettings) -> Result<()> {
    let config = settings.config;

    println!("\n{}", rule());
    println!("   vrp-bench - Routing Solver Consistency Benchmark");
    println!("{}", rule());
    println!();
    println!("Configuration:");
    println!("  Solver:       {}", settings.base_url);
    println!("  Dataset:      {}", config.dataset);
    println!("  Iterations:   {}", config.iteration_count);
    println!("  Output:       {}", settings.output_dir.display());
    println!("{}", rule());
    println!();

    let client = Arc::new(
        TimefoldClient::new(&settings.base_url, &settings.http)
            .context("Failed to create solver client")?,
    );
    let presenter = Arc::new(ConsolePresenter::new(config.iteration_count));
    let orchestrator = Arc::new(
        OrchestratorBuilder::new()
            .client(client.clone())
            .source(client)
            .presenter(presenter)
            .build()?,
    );

    let outcome = orchestrator.run_with_signal_handling(config).await;
    let state = orchestrator.snapshot().await;

    print_run(&state);
    if state.phase != RunPhase::Idle {
        export_run(&state, &settings.output_dir)?;
    }

    match outcome {
        Ok(state) if state.phase == RunPhase::Stopped => {
            println!(
                "\nBenchmark stopped after {} of {} iterations.",
                state.archive.len(),
                state.planned_iterations()
            );
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) => Err(e).context("Benchmark failed"),
    }
}

fn print_run(state: &BenchmarkRunState) {
    println!("\n{}", rule());
    println!("RESULTS");
    println!("{}", rule());
    print!("{}", results_table(&state.archive));

    if let (Some(stats), Some(tier)) = (&state.statistics, state.tier()) {
        let total = state
            .total_run_time()
            .map(|d| d.num_milliseconds() as f64 / 1000.0);
        println!();
        print!("{}", statistics_block(stats, tier, total));
    }
    if let Some(failure) = &state.failure {
        println!("\nRun failed: {}", failure);
    }
    println!("{}", rule());
}

fn export_run(state: &BenchmarkRunState, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;
    let document = ArchiveDocument::from_state(state);

    let json_path = output_dir.join("results.json");
    document
        .write_json(&json_path)
        .with_context(|| format!("Failed to export JSON to {}", json_path.display()))?;
    println!("✓ Results exported to: {}", json_path.display());

    let md_path = output_dir.join("summary.md");
    write_markdown(&document, &md_path)
        .with_context(|| format!("Failed to export markdown to {}", md_path.display()))?;
    println!("✓ Summary exported to: {}", md_path.display());

    let csv_path = output_dir.join("iterations.csv");
    CsvExporter::export(&state.archive, &csv_path)
        .with_context(|| format!("Failed to export CSV to {}", csv_path.display()))?;
    println!("✓ Iterations exported to: {}", csv_path.display());

    Ok(())
}

async fn solve_once(
    base_url: &str,
    dataset: DemoDataset,
    output: Option<&Path>,
    refresh_secs: u64,
) -> Result<()> {
    let client = Arc::new(
        TimefoldClient::new(base_url, &HttpConfig::default())
            .context("Failed to create solver client")?,
    );

    let problem = client
        .load(dataset)
        .await
        .map_err(|e| anyhow::anyhow!(e.diagnostic()))
        .with_context(|| format!("Failed to load demo data {}", dataset))?;
    println!(
        "Loaded {}: {} vehicles, {} visits",
        dataset,
        problem.vehicle_count(),
        problem.visit_count()
    );

    let session = Arc::new(
        SolveSession::new(client).with_poll_interval(Duration::from_secs(refresh_secs.max(1))),
    );
    let stopper = Arc::clone(&session);
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, terminating solve...");
            stopper.stop();
        }
    });

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Solving...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = session
        .solve(&problem, |elapsed| {
            spinner.set_message(format!("Solving... {}s", elapsed.as_secs()))
        })
        .await;
    signal_handle.abort();
    spinner.finish_and_clear();

    match outcome? {
        SessionOutcome::Solved {
            job,
            solution,
            enrichment,
            timings,
        } => {
            println!("\n{}", rule());
            println!("Job {} solved", job);
            println!("{}", rule());
            print!("{}", solve_summary(&solution, enrichment.is_some(), &timings));

            if let Some(path) = output {
                let file = fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                serde_json::to_writer_pretty(std::io::BufWriter::new(file), &solution)
                    .with_context(|| format!("Failed to write solution to {}", path.display()))?;
                println!("✓ Solution exported to: {}", path.display());
            }
        }
        SessionOutcome::Cancelled { job } => {
            println!("Solve cancelled, job {} terminated.", job);
        }
    }
    Ok(())
}

fn show_report(input: &Path, iteration: Option<usize>) -> Result<()> {
    let document = ArchiveDocument::read_json(input)
        .with_context(|| format!("Failed to load results from {}", input.display()))?;

    if let Some(index) = iteration {
        print!("{}", iteration_details(document.entry(index)?));
        return Ok(());
    }

    if let Some(config) = &document.config {
        println!(
            "{} x{} ({}), written by vrp-bench {}",
            config.dataset, config.iteration_count, document.phase, document.tool_version
        );
    }
    println!("{}", rule());
    print!("{}", results_table(&document.archive));
    if let (Some(stats), Some(tier)) = (&document.statistics, document.tier) {
        println!();
        print!(
            "{}",
            statistics_block(stats, tier, document.total_run_seconds())
        );
    }
    if let Some(failure) = &document.failure {
        println!("\nRun failed: {}", failure);
    }
    Ok(())
}

fn validate_run_file(path: &Path) -> Result<()> {
    let settings = RunFile::load(path)?
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    println!("✓ Configuration is valid");
    println!("  Solver:       {}", settings.base_url);
    println!("  Dataset:      {}", settings.config.dataset);
    println!("  Iterations:   {}", settings.config.iteration_count);
    println!("  Output:       {}", settings.output_dir.display());
    println!("  Timeout:      {}s", settings.http.request_timeout.as_secs());
    Ok(())
}
