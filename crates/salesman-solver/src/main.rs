// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! `salesman`: solve a TSPLIB-style instance to optimality.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use salesman_bnb::config::DEFAULT_WORKERS;
use salesman_model::tsplib::TspFileLoader;
use salesman_solver::solver::SolverBuilder;
use std::{path::PathBuf, time::Duration};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "salesman", version)]
#[command(about = "Exact parallel branch-and-bound solver for the symmetric TSP", long_about = None)]
struct Cli {
    /// Instance file (EUC_2D or GEO node coordinates)
    file: PathBuf,

    /// Number of worker threads
    #[arg(default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Depth below which partial tours are shared through the queue
    #[arg(long, value_name = "N")]
    depth: Option<usize>,

    /// Stop after this many seconds and report the best tour so far
    #[arg(long, value_name = "SECS")]
    time_limit: Option<f64>,

    /// Enumerate every tour instead of pruning against the best bound
    #[arg(long)]
    no_pruning: bool,

    /// Print the distance matrix before solving
    #[arg(long)]
    print_graph: bool,

    /// Print the search counters and the exhaustiveness check
    #[arg(long)]
    counters: bool,

    /// Log search progress every this many seconds
    #[arg(long, value_name = "SECS")]
    log_interval: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    ensure!(cli.workers > 0, "at least one worker thread is required");

    let graph = TspFileLoader::new()
        .from_path(&cli.file)
        .with_context(|| format!("failed to load instance {}", cli.file.display()))?;
    tracing::info!(
        file = %cli.file.display(),
        nodes = graph.size(),
        metric = ?graph.metric(),
        "loaded instance"
    );

    if cli.print_graph {
        println!("{}", graph);
    }

    let mut builder = SolverBuilder::new()
        .with_workers(cli.workers)
        .with_pruning(!cli.no_pruning);
    if let Some(depth) = cli.depth {
        ensure!(depth > 0, "the depth threshold must be at least 1");
        builder = builder.with_depth_threshold(depth);
    }
    if let Some(secs) = cli.time_limit {
        let limit = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid time limit {}", secs))?;
        builder = builder.with_time_limit(limit);
    }
    if let Some(secs) = cli.log_interval {
        builder = builder.with_log_interval(Duration::from_secs(secs.max(1)));
    }

    let outcome = builder.build().solve_detailed(&graph, None);

    match outcome.tour() {
        Some(tour) => println!("{}", tour),
        None => println!("no tour found"),
    }
    println!("{} ({})", outcome.result(), outcome.termination_reason());

    if cli.counters {
        println!();
        print!("{}", outcome.statistics());
        if outcome.is_optimal() {
            println!(
                "Exhaustiveness check: {}",
                if outcome.statistics().is_consistent(graph.size()) {
                    "ok"
                } else {
                    "FAILED"
                }
            );
        }
    }

    Ok(())
}
