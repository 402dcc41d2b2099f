//! # Task Management
//!
//! A small fixed pool of worker threads for background work.
//!
//! ## Task Lifecycle
//! 1. Tasks are handed over with [`TaskManager::publish_task`]
//! 2. The manager sends each task to the next free worker, round-robin, or
//!    queues it when every worker is busy
//! 3. Workers run [`Task::process`] and send the result back. A task that
//!    panics reports [`Task::failed`] instead and the worker keeps running
//! 4. [`TaskManager::process_completed_tasks`] applies results on the ticking
//!    thread without blocking, then feeds queued tasks to freed workers
//!
//! Each worker runs at most [`MAX_TASKS_IN_FLIGHT`] tasks at a time, so a
//! result always comes back on the channel of the worker that ran it.

pub mod task;

use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{channel, Receiver, Sender},
    thread::{self, JoinHandle},
};

use log::{debug, error, info, warn};

use crate::events::TerrainEvent;

pub use task::{Task, TaskResult};

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// The main thread's end of one worker.
#[derive(Debug)]
struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Dispatches tasks to worker threads and collects their results.
///
/// Workers exit once the manager is dropped and their task channel closes.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

impl TaskManager {
    /// Creates a manager with `num_workers` worker threads.
    ///
    /// # Panics
    /// Panics if a worker thread cannot be spawned.
    pub fn new(num_workers: usize) -> Self {
        info!(
            "Starting {} terrain workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        let channels = (0..num_workers)
            .map(|index| {
                let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
                let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

                let worker = thread::Builder::new()
                    .name(format!("terrain-worker-{index}"))
                    .spawn(move || {
                        while let Ok(task) = task_rx.recv() {
                            let result = panic::catch_unwind(AssertUnwindSafe(|| task.process()))
                                .unwrap_or_else(|_| {
                                    error!("Task on terrain worker {index} panicked");
                                    task.failed()
                                });
                            if result_tx.send(result).is_err() {
                                break;
                            }
                        }
                    })
                    .unwrap_or_else(|e| panic!("failed to spawn terrain worker {index}: {e}"));

                TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }
            })
            .collect();

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(returned) => {
                warn!("Terrain worker {channel_idx} is gone, requeueing task");
                Err(returned.0)
            }
        }
    }

    /// Next channel below [`MAX_TASKS_IN_FLIGHT`], searching round-robin from
    /// the last one used.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Hands a task to a free worker, or queues it.
    ///
    /// # Returns
    /// - `true` if a worker took the task immediately
    /// - `false` if it was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(()) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto free workers, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Applies every result that has arrived, without blocking.
    ///
    /// # Arguments
    /// * `events` - Receives the events raised by each applied result
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self, events: &mut Vec<TerrainEvent>) -> usize {
        let mut handled = 0;
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                events.extend(result.handle_result());
                handled += 1;
            }
        }

        if handled > 0 {
            debug!("Applied {handled} task results");
        }
        self.process_queued_tasks();
        handled
    }

    /// Tasks currently running on workers.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct Echo(i32);

    struct EchoResult(i32);

    impl Task for Echo {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            if self.0 < 0 {
                panic!("negative echo");
            }
            Box::new(EchoResult(self.0))
        }

        fn failed(&self) -> Box<dyn TaskResult + Send> {
            Box::new(EchoResult(0))
        }
    }

    impl TaskResult for EchoResult {
        fn handle_result(self: Box<Self>) -> Vec<TerrainEvent> {
            vec![TerrainEvent::GraphReady {
                nodes: self.0 as usize,
                edges: 0,
            }]
        }
    }

    fn drain(manager: &mut TaskManager, expected: usize) -> Vec<TerrainEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        let mut handled = 0;
        while handled < expected {
            assert!(Instant::now() < deadline, "tasks did not finish");
            handled += manager.process_completed_tasks(&mut events);
            thread::sleep(Duration::from_millis(1));
        }
        events
    }

    #[test]
    fn overflow_is_queued_then_drained() {
        let mut manager = TaskManager::new(2);
        let published: Vec<bool> = (0..5).map(|i| manager.publish_task(Box::new(Echo(i)))).collect();

        assert_eq!(published, vec![true, true, false, false, false]);
        assert_eq!(manager.queued_task_count(), 3);

        let events = drain(&mut manager, 5);
        assert_eq!(events.len(), 5);
        assert_eq!(manager.tasks_in_flight(), 0);
        assert_eq!(manager.queued_task_count(), 0);
    }

    #[test]
    fn panicking_task_still_reports_back() {
        let mut manager = TaskManager::new(1);
        manager.publish_task(Box::new(Echo(-1)));
        manager.publish_task(Box::new(Echo(7)));

        let events = drain(&mut manager, 2);
        assert_eq!(
            events,
            vec![
                TerrainEvent::GraphReady { nodes: 0, edges: 0 },
                TerrainEvent::GraphReady { nodes: 7, edges: 0 },
            ]
        );
        assert_eq!(manager.tasks_in_flight(), 0);
    }

    #[test]
    fn no_workers_queues_everything() {
        let mut manager = TaskManager::new(0);
        assert!(!manager.publish_task(Box::new(Echo(1))));
        assert_eq!(manager.process_completed_tasks(&mut Vec::new()), 0);
        assert_eq!(manager.queued_task_count(), 1);
    }
}
