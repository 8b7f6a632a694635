//! Run timing and result reporting.
//!
//! [`RunTimer`] wraps each benchmarked run with start/finish banners and
//! records wall-clock durations in execution order, then prints a summary
//! sorted fastest first.

use std::time::{Duration, Instant};

/// Records the wall-clock duration of named runs
#[derive(Debug, Default)]
pub struct RunTimer {
    /// Timings in execution order
    timings: Vec<(String, Duration)>,
}

impl RunTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `run`, bracketed by start/finish banners, and records the
    /// duration under `name`
    pub fn time<R>(&mut self, name: &str, run: impl FnOnce() -> R) -> R {
        println!("Starting {name}");
        let start = Instant::now();
        let result = run();
        let elapsed = start.elapsed();
        println!("Leaving {name}");
        self.timings.push((name.to_string(), elapsed));
        result
    }

    /// Recorded timings in execution order
    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    /// Prints all recorded timings, fastest first
    pub fn print_summary(&self) {
        let mut sorted: Vec<&(String, Duration)> = self.timings.iter().collect();
        sorted.sort_by_key(|(_, duration)| *duration);

        println!("\nTiming results (fastest first):");
        for (name, duration) in sorted {
            println!("  {:>10.2?}  {name}", duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_returns_run_result() {
        let mut timer = RunTimer::new();
        let value = timer.time("answer", || 42);
        assert_eq!(value, 42);
        assert_eq!(timer.timings().len(), 1);
        assert_eq!(timer.timings()[0].0, "answer");
    }

    #[test]
    fn test_timings_keep_execution_order() {
        let mut timer = RunTimer::new();
        timer.time("slow", || thread::sleep(Duration::from_millis(15)));
        timer.time("fast", || {});
        let names: Vec<&str> = timer.timings().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast"]);
        assert!(timer.timings()[0].1 >= Duration::from_millis(15));
    }
}
