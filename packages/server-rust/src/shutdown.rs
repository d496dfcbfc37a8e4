//! Cooperative shutdown signalling shared by the consumer and the HTTP
//! server.
//!
//! Uses `ArcSwap` for lock-free state reads and a watch channel to fan the
//! cancellation signal out to every running task.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Consumer lifecycle state, transitioned by the controller.
///
/// State machine: Stopped -> Running -> Cancelling -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No transport is active; the initial and terminal state.
    Stopped,
    /// The consume loop (or HTTP server) is accepting work.
    Running,
    /// Cancellation was signalled; no new work is accepted while broker
    /// registration, channel, and connection are torn down.
    Cancelling,
}

/// Coordinates graceful shutdown across the process.
///
/// Tasks subscribe before entering their loop and select on the receiver
/// alongside their main work; `begin_cancel()` flips the state and wakes
/// every subscriber. There is no forced preemption: a task finishes its
/// in-hand delivery before honoring the signal.
#[derive(Debug)]
pub struct ShutdownController {
    signal: watch::Sender<bool>,
    state: Arc<ArcSwap<LifecycleState>>,
}

impl ShutdownController {
    /// Creates a controller in the `Stopped` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            signal: tx,
            state: Arc::new(ArcSwap::from_pointee(LifecycleState::Stopped)),
        }
    }

    /// Returns a receiver that resolves once cancellation is signalled.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    /// Marks the transport as accepting work.
    pub fn set_running(&self) {
        self.state.store(Arc::new(LifecycleState::Running));
    }

    /// Signals cancellation: state moves to `Cancelling` and every
    /// subscriber wakes. Idempotent.
    pub fn begin_cancel(&self) {
        self.state.store(Arc::new(LifecycleState::Cancelling));
        // Send errors mean every receiver is gone already.
        let _ = self.signal.send(true);
    }

    /// Marks teardown complete.
    pub fn set_stopped(&self) {
        self.state.store(Arc::new(LifecycleState::Stopped));
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        **self.state.load()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_stopped() {
        let controller = ShutdownController::new();
        assert_eq!(controller.state(), LifecycleState::Stopped);
    }

    #[test]
    fn full_lifecycle_transitions() {
        let controller = ShutdownController::new();

        controller.set_running();
        assert_eq!(controller.state(), LifecycleState::Running);

        controller.begin_cancel();
        assert_eq!(controller.state(), LifecycleState::Cancelling);

        controller.set_stopped();
        assert_eq!(controller.state(), LifecycleState::Stopped);
    }

    #[test]
    fn begin_cancel_is_idempotent() {
        let controller = ShutdownController::new();
        controller.begin_cancel();
        controller.begin_cancel();
        assert_eq!(controller.state(), LifecycleState::Cancelling);
    }

    #[tokio::test]
    async fn subscribers_wake_on_cancel() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        assert!(!*rx.borrow());

        controller.begin_cancel();

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn late_subscribers_see_the_signal() {
        let controller = ShutdownController::new();
        controller.begin_cancel();

        // A receiver created after the fact still observes the flag.
        let rx = controller.subscribe();
        assert!(*rx.borrow());
    }
}
