//! What a finished run looked like.

use serde::{Deserialize, Serialize};

/// Summary of one [`Pipeline::run`](super::Pipeline::run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Pipeline label from the configuration.
    pub label: String,
    /// Final value of the cycle counter: the number of barrier rounds executed.
    pub cycles: u64,
    /// `cycles - 1`. The final round only flushes the termination token
    /// through the last stage and is not counted as a working cycle.
    pub reported_cycles: u64,
    /// One entry per stage, in chain order.
    pub stages: Vec<StageReport>,
}

/// Per-stage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Position in the chain.
    pub index: usize,
    /// Name given at registration.
    pub name: String,
    /// Barrier rounds this stage took part in.
    pub cycles: u64,
    /// Times the stage body ran.
    pub invocations: u64,
    /// Cycles skipped because the input was `Noop`.
    pub bubbles: u64,
    /// Tokens discarded while draining after the stage ended the stream itself.
    pub drained: u64,
    /// Cycle at the end of which the stage left the quorum.
    pub left_at: Option<u64>,
    /// The stage body, or an observer hook called from this stage's worker,
    /// panicked; the run treated it as `Terminate`.
    pub panicked: bool,
}

impl RunReport {
    pub(crate) fn new(label: &str, cycles: u64, stages: Vec<StageReport>) -> Self {
        Self {
            label: label.to_owned(),
            cycles,
            reported_cycles: cycles.saturating_sub(1),
            stages,
        }
    }

    /// Looks a stage up by name.
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Total stage-body invocations across the chain.
    pub fn invocations(&self) -> u64 {
        self.stages.iter().map(|s| s.invocations).sum()
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
