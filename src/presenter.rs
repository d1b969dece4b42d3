//! Terminal presenter with a progress bar

use indicatif::{ProgressBar, ProgressStyle};
use vrp_bench_core::{
    ArchiveEntry, ConsistencyTier, IterationResult, Presenter, PresenterError, RoutePlan,
    RunningStatistics,
};
use vrp_bench_report::iteration_details;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Renders orchestrator notifications on the terminal
pub struct ConsolePresenter {
    bar: ProgressBar,
}

impl ConsolePresenter {
    /// Presenter with a bar sized for `total` iterations
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self::with_bar(bar)
    }

    /// Presenter drawing on an existing bar
    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Presenter for ConsolePresenter {
    fn on_progress(
        &self,
        _iteration: usize,
        _total: usize,
        message: &str,
    ) -> Result<(), PresenterError> {
        self.bar.set_message(message.to_string());
        Ok(())
    }

    fn on_iteration_complete(
        &self,
        result: &IterationResult,
        _solution: &RoutePlan,
        statistics: &RunningStatistics,
    ) -> Result<(), PresenterError> {
        self.bar.inc(1);
        self.bar.println(format!(
            "  Iteration {}: {:.1}km in {:.1}s | best {:.1}km, avg {:.1}km, variance {:.1}%",
            result.index,
            result.primary_metric,
            result.elapsed_seconds,
            statistics.best,
            statistics.mean,
            statistics.std_dev_percent
        ));
        Ok(())
    }

    fn on_run_complete(
        &self,
        _statistics: &RunningStatistics,
        tier: ConsistencyTier,
    ) -> Result<(), PresenterError> {
        self.bar
            .finish_with_message(format!("Benchmark complete: {}", tier.label()));
        Ok(())
    }

    fn on_run_failed(&self, reason: &str) -> Result<(), PresenterError> {
        self.bar.abandon_with_message(format!("Benchmark failed: {}", reason));
        Ok(())
    }

    fn on_replay(&self, entry: &ArchiveEntry) -> Result<(), PresenterError> {
        self.bar.println(iteration_details(entry));
        Ok(())
    }
}
