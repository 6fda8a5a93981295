//! Cancellable polling tasks.
//!
//! Every recurring fetch in this crate runs through [`spawn_polling`]: one
//! spawned loop whose ticks run to completion before the next delay is
//! armed, owned by a [`PollHandle`]. Stopping the handle aborts the task, so
//! a tick suspended on a network call is dropped mid-flight and its response
//! is never applied; the shared token lets cooperating writers discard late
//! results on their side of a race.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// What a tick wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// Shared cancellation flag handed to each tick.
#[derive(Clone)]
pub struct PollToken {
    cancelled: Arc<AtomicBool>,
}

impl PollToken {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Owner handle for one polling loop. Dropping the handle tears the loop
/// down, so a dismissed view can never leave a timer armed.
pub struct PollHandle {
    token: PollToken,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the loop: no further ticks fire, and a tick currently suspended
    /// on a network call is aborted rather than awaited.
    pub fn stop(&self) {
        self.token.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Skip the remainder of the current delay and poll again now.
    pub fn wake_now(&self) {
        self.wake.notify_one();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn a polling loop: an immediate first tick, then one tick per
/// interval. A new tick never starts, nor is its delay armed, until the
/// previous tick has settled.
pub fn spawn_polling<F, Fut>(interval: Duration, mut tick: F) -> PollHandle
where
    F: FnMut(PollToken) -> Fut + Send + 'static,
    Fut: Future<Output = Tick> + Send,
{
    let token = PollToken {
        cancelled: Arc::new(AtomicBool::new(false)),
    };
    let wake = Arc::new(Notify::new());

    let loop_token = token.clone();
    let loop_wake = Arc::clone(&wake);
    let task = tokio::spawn(async move {
        loop {
            if loop_token.is_cancelled() {
                break;
            }
            if tick(loop_token.clone()).await == Tick::Stop {
                break;
            }
            if loop_token.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = loop_wake.notified() => {}
            }
        }
    });

    PollHandle { token, wake, task }
}
