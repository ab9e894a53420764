//! A five-stage instruction pipeline built on the driver.
//!
//! Text instructions are read one per line and walk through fetch, decode,
//! execute, memory access and write-back, one stage per cycle. Every stage
//! reports `<STAGE> <cycle>: <instruction>` through its context, and
//! [`ConsoleObserver`] prints those lines. A `nop` is squashed in decode and
//! travels the rest of the way as a bubble.
//!
//! ```
//! use lockstep::demo::{self, ConsoleObserver};
//! use lockstep::PipelineConfig;
//!
//! # #[cfg(not(feature = "loom"))]
//! # {
//! let console = ConsoleObserver::new(Vec::new());
//! let program = "add\nsub\n".as_bytes();
//! let report = demo::pipeline(program, PipelineConfig::default())
//!     .with_observer(&console)
//!     .run()
//!     .unwrap();
//! assert_eq!(report.reported_cycles, 6);
//! let lines = String::from_utf8(console.writer().clone()).unwrap();
//! assert!(lines.contains("IF 1: add"));
//! # }
//! ```

mod console;
mod instruction;
mod stages;

pub use console::ConsoleObserver;
pub use instruction::Instruction;
pub use stages::{Decode, Execute, Fetch, MemoryAccess, WriteBack};

use crate::pipeline::{Pipeline, PipelineConfig, RunReport};
use core::fmt;
use serde::Serialize;
use std::io::BufRead;

/// Stage names in chain order.
pub const STAGE_NAMES: [&str; 5] = ["IF", "ID", "EX", "MEM", "WB"];

/// Builds the IF/ID/EX/MEM/WB ring over `program`.
pub fn pipeline<'s, R>(program: R, config: PipelineConfig) -> Pipeline<'s, Instruction>
where
    R: BufRead + Send + 's,
{
    let mut pipeline = Pipeline::with_config(config);
    pipeline
        .add_named_stage(STAGE_NAMES[0], Fetch::new(program))
        .add_named_stage(STAGE_NAMES[1], Decode)
        .add_named_stage(STAGE_NAMES[2], Execute)
        .add_named_stage(STAGE_NAMES[3], MemoryAccess)
        .add_named_stage(STAGE_NAMES[4], WriteBack);
    pipeline
}

/// Throughput figures for a finished demo run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Reported cycle count.
    pub cycles: u64,
    /// Instructions that reached write-back.
    pub retired: u64,
}

impl Summary {
    /// Extracts the summary from a run report.
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            cycles: report.reported_cycles,
            retired: report.stage(STAGE_NAMES[4]).map_or(0, |wb| wb.invocations),
        }
    }

    /// Cycles per retired instruction, if anything retired.
    #[allow(clippy::cast_precision_loss)]
    pub fn cpi(&self) -> Option<f64> {
        (self.retired > 0).then(|| self.cycles as f64 / self.retired as f64)
    }

    /// Retired instructions per cycle, if any cycle was counted.
    #[allow(clippy::cast_precision_loss)]
    pub fn ipc(&self) -> Option<f64> {
        (self.cycles > 0).then(|| self.retired as f64 / self.cycles as f64)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Number of Cycles = {}", self.cycles)?;
        match self.cpi() {
            Some(cpi) => writeln!(f, "Average CPI = {cpi:.4}")?,
            None => writeln!(f, "Average CPI = n/a")?,
        }
        match self.ipc() {
            Some(ipc) => write!(f, "Average IPC = {ipc:.4}"),
            None => write!(f, "Average IPC = n/a"),
        }
    }
}
