use clap::Parser;
use scoped_threadpool::Pool;
use std::time::Duration;

mod models;
mod oracle;
mod report;
mod runner;
mod slices;

use models::{BenchConfig, CacheVariant, RunOutcome};
use report::RunTimer;
use runner::BenchmarkRunner;

/// Concurrent memoization map benchmark CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Compute iterations per worker; doubles as the top of the random
    /// candidate range
    #[arg(default_value = "100000", value_parser = clap::value_parser!(u32).range(1..))]
    iterations: u32,

    /// Number of worker threads (default: one per logical CPU)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Variants to benchmark (coarse, sharded, stamped, dashmap)
    /// If not provided, all variants will be run
    #[arg(long, value_name = "VARIANTS", num_args = 1.., value_delimiter = ',')]
    variants: Option<Vec<String>>,

    /// Per-variant deadline in seconds before the run is cancelled
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// Print per-worker progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let variants = match &args.variants {
        Some(names) => {
            let mut selected = Vec::new();
            for name in names {
                match CacheVariant::parse(name) {
                    Some(variant) => selected.push(variant),
                    None => eprintln!("Warning: unknown variant '{name}', skipping"),
                }
            }
            if selected.is_empty() {
                return Err("no valid variants selected".into());
            }
            selected
        }
        None => CacheVariant::all(),
    };

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let config = BenchConfig {
        iterations: args.iterations,
        threads,
        verbose: args.verbose,
        timeout: Duration::from_secs(args.timeout),
    };

    println!(
        "Benchmarking {} iteration(s) per worker across {} worker(s)",
        config.iterations, config.threads
    );

    let mut pool = Pool::new(config.threads as u32);
    let mut runner = BenchmarkRunner::new(&config, &mut pool);
    let mut timer = RunTimer::new();

    let mut outcomes: Vec<RunOutcome> = Vec::with_capacity(variants.len());
    for variant in variants {
        let outcome = timer.time(variant.as_str(), || runner.run(variant));
        if outcome.aborted {
            eprintln!("{variant} run was cancelled; its results are partial");
        }
        outcomes.push(outcome);
    }

    timer.print_summary();

    // Inspect one completed run, preferring the sharded variant's snapshot
    // and falling back to the last run that finished.
    let chosen = outcomes
        .iter()
        .find(|o| o.variant == CacheVariant::Sharded && !o.aborted)
        .or_else(|| outcomes.iter().rev().find(|o| !o.aborted));
    if let Some(outcome) = chosen {
        present(outcome);
    } else {
        eprintln!("All runs were cancelled; nothing to present");
    }

    Ok(())
}

/// Prints the memoized results of one run: the factor-sorted map, the prime
/// prefix, and the non-prime suffix
fn present(outcome: &RunOutcome) {
    let sorted = slices::sort_by_factor(outcome.snapshot.clone());
    let primes = slices::prime_prefix(&sorted);
    let composites = slices::non_prime_suffix(&sorted);

    println!(
        "\n{} results: {} distinct candidates ({} prime, {} composite)",
        outcome.variant,
        outcome.entries,
        primes.len(),
        composites.len()
    );
    println!("Sorted by smallest factor: {sorted:?}");
    println!("Primes: {primes:?}");
    println!("Non-primes (candidate, smallest factor): {composites:?}");
}
