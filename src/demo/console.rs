use crate::concurrency::{SpinLock, SpinLockGuard};
use crate::pipeline::{PipelineObserver, StageId};
use core::fmt;
use std::io::Write;

/// Prints stage messages as `<stage> <cycle>: <message>`, one per line.
///
/// Workers report from their own threads; the writer sits behind a
/// [`SpinLock`] so lines never interleave.
pub struct ConsoleObserver<W> {
    out: SpinLock<W>,
}

impl<W: Write + Send> ConsoleObserver<W> {
    /// Writes to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: SpinLock::new(out),
        }
    }

    /// Locks the underlying writer.
    pub fn writer(&self) -> SpinLockGuard<'_, W> {
        self.out.acquire()
    }
}

impl ConsoleObserver<std::io::Stdout> {
    /// Writes to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PipelineObserver for ConsoleObserver<W> {
    fn on_message(&self, stage: StageId<'_>, cycle: u64, message: fmt::Arguments<'_>) {
        let mut out = self.out.acquire();
        if let Err(err) = writeln!(out, "{stage} {cycle}: {message}") {
            tracing::warn!(stage = stage.name, cycle, error = %err, "console write failed");
        }
        out.release();
    }
}

impl<W> fmt::Debug for ConsoleObserver<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleObserver").finish_non_exhaustive()
    }
}
