//                  _   ____      _
//  _ __ ___  _ __ / | / ___|(_)_ __ ___
// | '_ ` _ \| '_ `| | \___ \| | '_ ` _ \
// | | | | | | | | | |  ___) | | | | | | |
// |_| |_| |_|_| |_|_| |____/|_|_| |_| |_|

// Copyright 2025 the mm1sim authors

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use mm1sim::metrics::analyzer;
use mm1sim::metrics::logger::ReplicationLogger;
use mm1sim::prelude::*;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args, Clone)]
struct QueueArgs {
    #[arg(short, long, default_value_t = 3.0)]
    lambda: f64,
    #[arg(short, long, default_value_t = 4.0)]
    mu: f64,
    #[arg(short = 'T', long, default_value_t = 500.0)]
    horizon: f64,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(short, long, default_value_t = 0.95)]
    confidence: f64,
}

impl QueueArgs {
    fn config(&self, replications: usize) -> SimConfig {
        let mut config = SimConfig::new(self.lambda, self.mu, self.horizon, replications)
            .with_confidence(self.confidence)
            .with_name(format!("mm1_n{}", replications));
        config.seed = self.seed;
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate all metrics for one replication count.
    Run {
        #[command(flatten)]
        queue: QueueArgs,
        #[arg(short = 'n', long, default_value_t = 1000)]
        replications: usize,
        /// Write every replication's means to this CSV file.
        #[arg(long)]
        samples: Option<String>,
        /// Write the report as JSON.
        #[arg(long)]
        json: Option<String>,
    },

    /// Repeat the estimate over several replication counts.
    Sweep {
        #[command(flatten)]
        queue: QueueArgs,
        #[arg(short, long, default_value = "30,100,1000")]
        replications: String,
        /// Save the reports as JSON under results/.
        #[arg(long)]
        save: bool,
        #[arg(long)]
        latex: bool,
    },

    /// Print the closed-form values.
    Theory {
        #[arg(short, long, default_value_t = 3.0)]
        lambda: f64,
        #[arg(short, long, default_value_t = 4.0)]
        mu: f64,
    },
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --verbose picks the level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            queue,
            replications,
            samples,
            json,
        } => run_single(&queue, replications, samples.as_deref(), json.as_deref())?,

        Commands::Sweep {
            queue,
            replications,
            save,
            latex,
        } => sweep(&queue, &replications, save, latex)?,

        Commands::Theory { lambda, mu } => {
            let theory = Theoretical::mm1(lambda, mu)?;
            println!("\nM/M/1 closed form, lambda={}, mu={}", lambda, mu);
            for metric in Metric::ALL {
                println!("  {:<26} {:>10.4}", metric.label(), theory.value(metric));
            }
            println!();
        }
    }

    info!("Total runtime: {:.2}s", program_start.elapsed().as_secs_f64());

    Ok(())
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn run_single(
    queue: &QueueArgs,
    replications: usize,
    samples: Option<&str>,
    json: Option<&str>,
) -> Result<()> {
    let mut sim = Simulation::new(queue.config(replications)).with_progress(true);
    let report = sim.run()?;

    print_report(&report);

    if let Some(path) = samples {
        let mut logger = ReplicationLogger::new(path)?;
        logger.log_batch(sim.results())?;
        info!("Replication samples saved to: {}", path);
    }
    if let Some(path) = json {
        analyzer::save_json(std::slice::from_ref(&report), path)?;
        info!("Report saved to: {}", path);
    }

    Ok(())
}

/// Parses a comma-separated list of replication counts, e.g. "30,100,1000".
fn parse_counts(counts: &str) -> Result<Vec<usize>> {
    let counts = counts
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| anyhow::anyhow!("Invalid replication count '{}': {}", s, e))
        })
        .collect::<Result<Vec<_>>>()?;
    if counts.is_empty() {
        anyhow::bail!("No replication counts given");
    }
    Ok(counts)
}

fn sweep(queue: &QueueArgs, counts: &str, save: bool, latex: bool) -> Result<()> {
    let counts = parse_counts(counts)?;

    info!("Replication counts: {:?}", counts);

    let mut reports = Vec::new();
    for replications in counts {
        let report = Simulation::new(queue.config(replications))
            .with_progress(true)
            .run()?;
        print_report(&report);
        reports.push(report);
    }

    convergence_table(&reports);

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    if save {
        let path = format!("results/sweep_{}.json", timestamp);
        analyzer::save_json(&reports, &path)?;
        info!("Sweep saved to: {}", path);
    }

    if latex {
        export_latex(&reports, &format!("results/sweep_{}_table.tex", timestamp))?;
    }

    Ok(())
}

#[cfg(feature = "latex-export")]
fn export_latex(reports: &[Report], path: &str) -> Result<()> {
    analyzer::export_latex_table(reports, path)?;
    info!("LaTeX table exported to: {}", path);
    info!("   \\input{{{}}}", path);
    Ok(())
}

#[cfg(not(feature = "latex-export"))]
fn export_latex(_reports: &[Report], _path: &str) -> Result<()> {
    anyhow::bail!("LaTeX export needs the `latex-export` feature")
}

fn print_report(report: &Report) {
    println!("\nFor {} replications:", report.replications);
    for e in &report.estimates {
        let unit = match e.metric.unit() {
            "" => String::new(),
            unit => format!(" {}", unit),
        };
        println!(
            "{}: {}{}, {:.0}% CI: ({}, {}), Relative Error: {}",
            e.metric.label(),
            e.mean,
            unit,
            report.confidence * 100.0,
            e.interval.lower,
            e.interval.upper,
            e.relative_error,
        );
    }
}

fn convergence_table(reports: &[Report]) {
    println!("\n╔══════════════════════════╦═══════╦════════════╦════════════╦════════════╗");
    println!("║ Metric                   ║     N ║ Mean       ║ Half-width ║ Rel. error ║");
    println!("╠══════════════════════════╬═══════╬════════════╬════════════╬════════════╣");

    for row in analyzer::convergence(reports) {
        println!(
            "║ {:<24} ║ {:>5} ║ {:>10.4} ║ {:>10.4} ║ {:>9.2}% ║",
            row.metric.label(),
            row.replications,
            row.mean,
            row.half_width,
            row.relative_error * 100.0,
        );
    }

    println!("╚══════════════════════════╩═══════╩════════════╩════════════╩════════════╝\n");
}
