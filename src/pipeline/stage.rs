//! The capability a pipeline drives once per cycle.

use super::observer::{PipelineObserver, StageId};
use crate::token::Token;
use core::fmt;

/// A processing stage.
///
/// The driver calls [`process`](Stage::process) at most once per cycle with the
/// predecessor's output: `Some(payload)` for real work, `None` when the
/// predecessor handed over a bootstrap go-ahead. `Noop` and `Terminate` are
/// handled by the driver and never reach a stage.
///
/// Returning [`Token::Terminate`] ends the stream: the stage is never invoked
/// again and the rest of the ring drains behind it.
///
/// Closures become stages through [`from_fn`].
pub trait Stage<T>: Send {
    /// Processes one input and returns the token for the successor.
    fn process(&mut self, input: Option<T>, cx: &StageContext<'_>) -> Token<T>;
}

/// A stage backed by a closure. Created by [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

/// Wraps a closure as a [`Stage`].
///
/// ```
/// use lockstep::pipeline::stage;
///
/// let double = stage::from_fn(|input: Option<u32>, _cx| input.map(|v| v * 2).into());
/// # let _ = double;
/// ```
pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnMut(Option<T>, &StageContext<'_>) -> Token<T> + Send,
{
    FromFn(f)
}

impl<T, F> Stage<T> for FromFn<F>
where
    F: FnMut(Option<T>, &StageContext<'_>) -> Token<T> + Send,
{
    #[inline]
    fn process(&mut self, input: Option<T>, cx: &StageContext<'_>) -> Token<T> {
        (self.0)(input, cx)
    }
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FromFn")
    }
}

/// Where and when a stage is being invoked, plus a channel to the observer.
pub struct StageContext<'a> {
    pub(crate) stage: StageId<'a>,
    pub(crate) cycle: u64,
    pub(crate) observer: &'a dyn PipelineObserver,
}

impl<'a> StageContext<'a> {
    /// Position of the stage in the chain; the generator is 0.
    #[inline]
    pub fn index(&self) -> usize {
        self.stage.index
    }

    /// Name given at registration.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.stage.name
    }

    /// The cycle this invocation belongs to, starting at 1.
    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns `true` for the first stage of the chain.
    #[inline]
    pub fn is_generator(&self) -> bool {
        self.stage.index == 0
    }

    /// Forwards a message to the pipeline's observer, tagged with this stage and cycle.
    pub fn report(&self, message: fmt::Arguments<'_>) {
        self.observer.on_message(self.stage, self.cycle, message);
    }
}

impl fmt::Debug for StageContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("stage", &self.stage)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}
