//! # Task Traits
//!
//! A [`Task`] is pure computation that runs on a worker thread and owns
//! everything it reads. Its [`TaskResult`] travels back to the ticking thread,
//! where it is applied and may raise [`TerrainEvent`]s.

use crate::events::TerrainEvent;

/// A unit of background work.
///
/// Tasks must own their inputs (cloned snapshots, shared handles) so that
/// nothing they read can change underneath them while they run.
pub trait Task: Send {
    /// Does the work on a worker thread.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be applied on the ticking thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// Result reported in place of [`process`](Self::process) when it panics,
    /// so whoever waits on the task still hears back.
    fn failed(&self) -> Box<dyn TaskResult + Send>;
}

/// The output of a [`Task`], applied on the ticking thread.
pub trait TaskResult: Send {
    /// Applies the result.
    ///
    /// # Returns
    /// Events raised by applying it, in order.
    fn handle_result(self: Box<Self>) -> Vec<TerrainEvent>;
}
