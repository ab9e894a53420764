//! Pipeline observer: hooks for logging, tracing and test instrumentation.
//!
//! The observer is injected into a [`Pipeline`](super::Pipeline) and shared by
//! reference with every worker. Workers call it from their own threads, so
//! implementations must be `Sync`. All hooks default to doing nothing.

use super::report::RunReport;
use crate::token::TokenKind;
use core::fmt;

/// Identity of a stage in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId<'a> {
    /// Position in the chain; the generator is 0.
    pub index: usize,
    /// Name given at registration.
    pub name: &'a str,
}

impl fmt::Display for StageId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Receives events from a running pipeline.
pub trait PipelineObserver: Sync {
    /// `run` is about to spawn `stages` workers.
    fn on_run_start(&self, label: &str, stages: usize) {
        let _ = (label, stages);
    }

    /// A running stage crossed the barrier into `cycle` holding a token of class `input`.
    fn on_dispatch(&self, stage: StageId<'_>, cycle: u64, input: TokenKind) {
        let _ = (stage, cycle, input);
    }

    /// A stage left the barrier quorum at the end of `cycle`.
    fn on_leave(&self, stage: StageId<'_>, cycle: u64) {
        let _ = (stage, cycle);
    }

    /// A stage's worker reached its terminal state. `cycle` is its last cycle.
    fn on_terminated(&self, stage: StageId<'_>, cycle: u64) {
        let _ = (stage, cycle);
    }

    /// A stage reported a message through its
    /// [`StageContext`](super::StageContext).
    fn on_message(&self, stage: StageId<'_>, cycle: u64, message: fmt::Arguments<'_>) {
        let _ = (stage, cycle, message);
    }

    /// Every worker has terminated.
    fn on_run_end(&self, report: &RunReport) {
        let _ = report;
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Forwards events to `tracing`.
///
/// Stage messages become `info` events; per-cycle dispatches are `trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_run_start(&self, label: &str, stages: usize) {
        tracing::info!(pipeline = label, stages, "pipeline starting");
    }

    fn on_dispatch(&self, stage: StageId<'_>, cycle: u64, input: TokenKind) {
        tracing::trace!(stage = stage.name, cycle, %input, "dispatch");
    }

    fn on_leave(&self, stage: StageId<'_>, cycle: u64) {
        tracing::debug!(stage = stage.name, cycle, "left barrier");
    }

    fn on_terminated(&self, stage: StageId<'_>, cycle: u64) {
        tracing::debug!(stage = stage.name, cycle, "terminated");
    }

    fn on_message(&self, stage: StageId<'_>, cycle: u64, message: fmt::Arguments<'_>) {
        tracing::info!(stage = stage.name, cycle, "{message}");
    }

    fn on_run_end(&self, report: &RunReport) {
        tracing::info!(
            cycles = report.cycles,
            reported_cycles = report.reported_cycles,
            "pipeline finished"
        );
    }
}

impl<O: PipelineObserver + ?Sized> PipelineObserver for &O {
    fn on_run_start(&self, label: &str, stages: usize) {
        (**self).on_run_start(label, stages);
    }

    fn on_dispatch(&self, stage: StageId<'_>, cycle: u64, input: TokenKind) {
        (**self).on_dispatch(stage, cycle, input);
    }

    fn on_leave(&self, stage: StageId<'_>, cycle: u64) {
        (**self).on_leave(stage, cycle);
    }

    fn on_terminated(&self, stage: StageId<'_>, cycle: u64) {
        (**self).on_terminated(stage, cycle);
    }

    fn on_message(&self, stage: StageId<'_>, cycle: u64, message: fmt::Arguments<'_>) {
        (**self).on_message(stage, cycle, message);
    }

    fn on_run_end(&self, report: &RunReport) {
        (**self).on_run_end(report);
    }
}
