//! The lock-step pipeline driver.
//!
//! Stages are registered in order and wired into a ring: stage `i` consumes
//! the output latch of stage `i - 1`, and stage 0 (the generator) consumes the
//! output latch of the last stage. Each stage gets its own thread for the
//! duration of [`Pipeline::run`]. Every cycle, every running worker consumes one
//! token, meets the others at a shared barrier, then produces one token. The
//! wraparound edge means the generator cannot start cycle `t + 1` before the
//! last stage has finished cycle `t`, so the whole ring advances at the pace of
//! its slowest stage with exactly one token in flight per edge.
//!
//! The stream ends when a stage returns [`Token::Terminate`](crate::Token::Terminate). That stage leaves
//! the barrier and drains its input; the termination token then travels one
//! hop per cycle, each stage leaving the quorum as it passes, until every
//! worker has stopped.
//!
//! ```
//! use lockstep::pipeline::{stage, Pipeline};
//! use lockstep::Token;
//!
//! # #[cfg(not(feature = "loom"))]
//! # {
//! let mut source = vec!["b", "a"];
//! let mut pipeline: Pipeline<'_, &str> = Pipeline::new();
//! pipeline
//!     .add_stage(stage::from_fn(move |_: Option<&str>, _| source.pop().into()))
//!     .add_stage(stage::from_fn(|input: Option<&str>, _| input.map_or(Token::Bootstrap, Token::Payload)))
//!     .add_stage(stage::from_fn(|input: Option<&str>, _| input.map_or(Token::Bootstrap, Token::Payload)));
//!
//! let report = pipeline.run().unwrap();
//! assert_eq!(report.cycles, 5);
//! assert_eq!(report.reported_cycles, 4);
//! # }
//! ```

pub mod config;
mod error;
pub mod observer;
pub mod report;
pub mod stage;
mod worker;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use observer::{NoopObserver, PipelineObserver, StageId, TracingObserver};
pub use report::{RunReport, StageReport};
pub use stage::{Stage, StageContext};

use crate::concurrency::{Barrier, Latch};
use crate::token::Placeholder;
use crossbeam_utils::CachePadded;
use std::panic;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use worker::{Worker, WorkerOutcome};

/// The shared cycle counter.
///
/// Every running worker advances it to the same value after each barrier
/// round; `fetch_max` keeps it monotonic without a designated writer.
#[derive(Debug, Default)]
pub struct CycleCounter(CachePadded<AtomicU64>);

impl CycleCounter {
    /// The latest cycle any worker has entered. 0 before the first round.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn advance_to(&self, cycle: u64) {
        self.0.fetch_max(cycle, Ordering::AcqRel);
    }

    fn reset(&self) {
        self.0.store(0, Ordering::Release);
    }
}

/// A registered stage: its place in the ring, its body and its output latch.
pub struct StageDescriptor<'s, T> {
    index: usize,
    pred: usize,
    name: String,
    stage: Box<dyn Stage<T> + 's>,
    out: Latch<T>,
}

impl<T> StageDescriptor<'_, T> {
    /// Position in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the stage whose output this stage consumes.
    pub fn predecessor(&self) -> usize {
        self.pred
    }

    /// Name given at registration.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> core::fmt::Debug for StageDescriptor<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StageDescriptor")
            .field("index", &self.index)
            .field("pred", &self.pred)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

const GATE_CLOSED: u8 = 0;
const GATE_OPEN: u8 = 1;
const GATE_ABORTED: u8 = 2;

/// A ring of stages advanced in lock-step, one thread per stage.
pub struct Pipeline<'s, T> {
    stages: Vec<StageDescriptor<'s, T>>,
    counter: Arc<CycleCounter>,
    config: PipelineConfig,
    observer: Box<dyn PipelineObserver + 's>,
}

impl<'s, T: Send + 's> Pipeline<'s, T> {
    /// Creates an empty pipeline with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Creates an empty pipeline.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            stages: Vec::new(),
            counter: Arc::default(),
            config,
            observer: Box::new(NoopObserver),
        }
    }

    /// Replaces the observer that receives run events and stage messages.
    pub fn with_observer(mut self, observer: impl PipelineObserver + 's) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Appends a stage named `stage<index>`.
    pub fn add_stage(&mut self, stage: impl Stage<T> + 's) -> &mut Self {
        let name = format!("stage{}", self.stages.len());
        self.add_named_stage(name, stage)
    }

    /// Appends a stage.
    ///
    /// The new stage consumes its predecessor's output, and stage 0 is
    /// re-pointed at the new stage so the chain always closes into a ring.
    pub fn add_named_stage(&mut self, name: impl Into<String>, stage: impl Stage<T> + 's) -> &mut Self {
        let index = self.stages.len();
        if let Some(generator) = self.stages.first_mut() {
            generator.pred = index;
        }
        self.stages.push(StageDescriptor {
            index,
            // A lone generator feeds itself.
            pred: index.saturating_sub(1),
            name: name.into(),
            stage: Box::new(stage),
            out: Latch::with_strategy(self.config.wait),
        });
        self
    }

    /// Registered stages, in chain order.
    pub fn stages(&self) -> &[StageDescriptor<'s, T>] {
        &self.stages
    }

    /// Number of registered stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if no stage has been registered.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current value of the cycle counter.
    ///
    /// After [`run`](Self::run) returns this is the number of rounds executed;
    /// the conventional "total cycles" figure is one less.
    pub fn cycle_count(&self) -> u64 {
        self.counter.get()
    }

    /// A handle on the cycle counter that other threads may read during a run.
    pub fn cycle_counter(&self) -> Arc<CycleCounter> {
        Arc::clone(&self.counter)
    }

    /// Runs the ring until every stage has terminated.
    ///
    /// Does nothing when no stage is registered. Blocks the caller until the
    /// last worker has stopped. The cycle counter restarts from 0 on each call.
    pub fn run(&mut self) -> Result<RunReport, PipelineError> {
        let label = self.config.label.as_str();
        let wait = self.config.wait;
        let n = self.stages.len();
        if n == 0 {
            return Ok(RunReport::new(label, 0, Vec::new()));
        }

        self.counter.reset();
        let last = n - 1;
        for descriptor in &mut self.stages {
            let placeholder = if descriptor.index == last {
                Placeholder::Bootstrap
            } else {
                Placeholder::Noop
            };
            descriptor.out.prime(placeholder.into());
            descriptor.out.set_noop_placeholder(placeholder);
        }

        let observer: &dyn PipelineObserver = &*self.observer;
        let counter: &CycleCounter = &self.counter;
        let barrier = Barrier::with_strategy(n, wait);
        observer.on_run_start(label, n);
        tracing::debug!(pipeline = label, stages = n, ?wait, "spawning workers");

        let mut bodies = Vec::with_capacity(n);
        let mut outs = Vec::with_capacity(n);
        let mut links = Vec::with_capacity(n);
        for StageDescriptor {
            index,
            pred,
            name,
            stage,
            out,
        } in &mut self.stages
        {
            links.push((
                StageId {
                    index: *index,
                    name: name.as_str(),
                },
                *pred,
            ));
            outs.push(&*out);
            bodies.push(&mut **stage);
        }

        let gate = AtomicU8::new(GATE_CLOSED);
        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(n);
            for (stage, (id, pred)) in bodies.into_iter().zip(links) {
                let worker = Worker::new(id, stage, outs[pred], outs[id.index], &barrier, counter, observer);
                let gate = &gate;
                let spawned = thread::Builder::new()
                    .name(format!("{label}-{}", id.name))
                    .spawn_scoped(scope, move || {
                        wait.wait_until(|| gate.load(Ordering::Acquire) != GATE_CLOSED);
                        (gate.load(Ordering::Acquire) == GATE_OPEN).then(|| worker.run())
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        tracing::warn!(pipeline = label, stage = id.name, error = %source, "worker spawn failed");
                        gate.store(GATE_ABORTED, Ordering::Release);
                        return Err(PipelineError::Spawn {
                            index: id.index,
                            source,
                        });
                    }
                }
            }
            gate.store(GATE_OPEN, Ordering::Release);

            Ok(handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(payload) => panic::resume_unwind(payload),
                })
                .collect::<Vec<_>>())
        })?;

        let mut failure = None;
        let mut stages = Vec::with_capacity(n);
        for WorkerOutcome { report, panic: panicked } in outcomes.into_iter().flatten() {
            if let (None, Some(message)) = (&failure, panicked) {
                failure = Some(PipelineError::StagePanicked {
                    index: report.index,
                    name: report.name.clone(),
                    message,
                });
            }
            stages.push(report);
        }

        let report = RunReport::new(label, counter.get(), stages);
        tracing::debug!(pipeline = label, cycles = report.cycles, "all workers terminated");
        observer.on_run_end(&report);
        match failure {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}

impl<'s, T: Send + 's> Default for Pipeline<'s, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Pipeline<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("cycles", &self.counter.get())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
