//! # `lockstep` - Lock-step Pipeline Driver
//!
//! Runs a chain of processing stages on one thread each, advancing the whole
//! chain one cycle at a time. Every cycle each stage takes one token from its
//! predecessor, meets the other stages at a barrier, and hands one token to its
//! successor. The last stage feeds back into the first, so the chain is a ring
//! and the generator can only run as fast as the slowest stage lets it.
//!
//! ## Building blocks
//!
//! - [`SpinLock`]: a busy-wait mutual-exclusion lock with an RAII guard.
//! - [`Latch`]: a single-slot handoff between one producer and one consumer.
//! - [`Barrier`]: a reusable barrier whose quorum can shrink while in use.
//! - [`Pipeline`]: the driver that wires stages, latches and the barrier
//!   together and counts cycles.
//!
//! ## Tokens
//!
//! [`Token`] carries either a payload or one of three control values
//! (`Noop`, `Bootstrap`, `Terminate`). Control values are intercepted by the
//! driver; stages only ever see payloads or a bootstrap go-ahead.
//!
//! ## Example
//!
//! ```
//! use lockstep::pipeline::stage;
//! use lockstep::{Pipeline, Token};
//!
//! # #[cfg(not(feature = "loom"))]
//! # {
//! let mut next = 0u32;
//! let mut sum = 0u32;
//! {
//!     let mut pipeline = Pipeline::new();
//!     pipeline
//!         .add_stage(stage::from_fn(move |_: Option<u32>, _| {
//!             next += 1;
//!             if next > 3 { Token::Terminate } else { Token::Payload(next) }
//!         }))
//!         .add_stage(stage::from_fn(|input: Option<u32>, _| {
//!             sum += input.unwrap_or(0);
//!             Token::Bootstrap
//!         }));
//!     let report = pipeline.run().unwrap();
//!     assert_eq!(report.cycles, 5);
//! }
//! assert_eq!(sum, 6);
//! # }
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod concurrency;
pub mod demo;
pub mod pipeline;
pub mod token;

mod shim;

pub use concurrency::{Barrier, Latch, SpinLock, SpinLockGuard, WaitStrategy};
pub use pipeline::{
    Pipeline, PipelineConfig, PipelineError, PipelineObserver, RunReport, Stage, StageContext,
    StageReport,
};
pub use token::{Placeholder, Token, TokenKind};
