//! The per-stage worker: one cycle at a time, then the drain.
//!
//! ```text
//! RUNNING --(sees or emits Terminate)--> DRAINING --(consumes Terminate)--> TERMINATED
//!    \______________(consumes Terminate)__________________________________/
//! ```

use super::observer::{PipelineObserver, StageId};
use super::report::StageReport;
use super::stage::{Stage, StageContext};
use super::CycleCounter;
use crate::concurrency::{Barrier, Latch};
use crate::token::Token;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    /// Consuming, synchronizing and producing once per cycle.
    Running,
    /// Out of the quorum; sinking the predecessor's tokens until it terminates.
    Draining,
    /// Done: `Terminate` has been handed on and nothing more will be consumed.
    Terminated,
}

pub(crate) struct WorkerOutcome {
    pub(crate) report: StageReport,
    pub(crate) panic: Option<String>,
}

pub(crate) struct Worker<'a, T, S: ?Sized> {
    id: StageId<'a>,
    stage: &'a mut S,
    input: &'a Latch<T>,
    output: &'a Latch<T>,
    barrier: &'a Barrier,
    counter: &'a CycleCounter,
    observer: &'a dyn PipelineObserver,
    state: WorkerState,
    cycle: u64,
    report: StageReport,
    panic: Option<String>,
}

impl<'a, T, S> Worker<'a, T, S>
where
    S: Stage<T> + ?Sized,
{
    pub(crate) fn new(
        id: StageId<'a>,
        stage: &'a mut S,
        input: &'a Latch<T>,
        output: &'a Latch<T>,
        barrier: &'a Barrier,
        counter: &'a CycleCounter,
        observer: &'a dyn PipelineObserver,
    ) -> Self {
        Self {
            id,
            stage,
            input,
            output,
            barrier,
            counter,
            observer,
            state: WorkerState::Running,
            cycle: 0,
            report: StageReport {
                index: id.index,
                name: id.name.to_owned(),
                ..StageReport::default()
            },
            panic: None,
        }
    }

    pub(crate) fn run(mut self) -> WorkerOutcome {
        while self.state != WorkerState::Terminated {
            self.state = match self.state {
                WorkerState::Running => self.run_cycle(),
                WorkerState::Draining => self.drain_one(),
                WorkerState::Terminated => WorkerState::Terminated,
            };
        }
        let (id, cycle) = (self.id, self.cycle);
        self.notify(|observer| observer.on_terminated(id, cycle));
        self.report.cycles = self.cycle;
        WorkerOutcome {
            report: self.report,
            panic: self.panic,
        }
    }

    fn run_cycle(&mut self) -> WorkerState {
        let token = self.input.consume();
        self.barrier.rendezvous();
        self.cycle += 1;
        self.counter.advance_to(self.cycle);
        let (id, cycle, kind) = (self.id, self.cycle, token.kind());
        if !self.notify(|observer| observer.on_dispatch(id, cycle, kind)) {
            return self.abandon(token);
        }

        match token {
            Token::Noop => {
                self.report.bubbles += 1;
                self.output.produce_placeholder();
                WorkerState::Running
            }
            Token::Terminate => self.pass_terminate(),
            Token::Bootstrap => self.invoke(None),
            Token::Payload(value) => self.invoke(Some(value)),
        }
    }

    fn invoke(&mut self, input: Option<T>) -> WorkerState {
        self.report.invocations += 1;
        let cx = StageContext {
            stage: self.id,
            cycle: self.cycle,
            observer: self.observer,
        };
        let stage = &mut *self.stage;
        let result = match panic::catch_unwind(AssertUnwindSafe(|| stage.process(input, &cx))) {
            Ok(token) => token,
            Err(payload) => {
                self.record_panic(panic_message(payload.as_ref()));
                Token::Terminate
            }
        };

        let terminate = result.is_terminate();
        self.output.produce(result);
        if terminate {
            self.leave();
            WorkerState::Draining
        } else {
            WorkerState::Running
        }
    }

    fn pass_terminate(&mut self) -> WorkerState {
        self.leave();
        self.output.produce(Token::Terminate);
        WorkerState::Terminated
    }

    /// Ends the stream from this stage without running the body, as if it had
    /// returned `Terminate`. The token in hand is dropped.
    fn abandon(&mut self, token: Token<T>) -> WorkerState {
        if token.is_terminate() {
            return self.pass_terminate();
        }
        drop(token);
        self.output.produce(Token::Terminate);
        self.leave();
        WorkerState::Draining
    }

    fn leave(&mut self) {
        self.barrier.leave();
        self.report.left_at = Some(self.cycle);
        let (id, cycle) = (self.id, self.cycle);
        self.notify(|observer| observer.on_leave(id, cycle));
    }

    /// Runs an observer hook. A panicking hook is recorded like a panicking
    /// stage; returns `false` if it panicked.
    fn notify(&mut self, hook: impl FnOnce(&dyn PipelineObserver)) -> bool {
        let observer = self.observer;
        match panic::catch_unwind(AssertUnwindSafe(|| hook(observer))) {
            Ok(()) => true,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.record_panic(format!("observer: {message}"));
                false
            }
        }
    }

    fn record_panic(&mut self, message: String) {
        tracing::error!(stage = self.id.name, cycle = self.cycle, %message, "panic in stage worker, terminating");
        self.report.panicked = true;
        if self.panic.is_none() {
            self.panic = Some(message);
        }
    }

    /// The predecessor may be spinning in `produce`; keep its slot empty until
    /// it has handed over its own `Terminate`.
    fn drain_one(&mut self) -> WorkerState {
        match self.input.consume() {
            Token::Terminate => WorkerState::Terminated,
            _ => {
                self.report.drained += 1;
                WorkerState::Draining
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
