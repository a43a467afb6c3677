//! Seam between the navigator and the scroll-physics layer
//!
//! The navigator never assumes a completion callback will fire. Each
//! `scroll_to` carries a single-shot `Completion`; the navigator keeps the
//! paired waiter and pairs it with a watchdog.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Single-shot completion handed to the controller with each animated scroll
#[derive(Debug)]
pub struct Completion {
    animation_id: String,
    tx: oneshot::Sender<()>,
}

impl Completion {
    pub fn animation_id(&self) -> &str {
        &self.animation_id
    }

    /// Report that the animation reached its target. Dropping a `Completion`
    /// without calling this tells the navigator the controller gave up.
    pub fn complete(self) {
        // The navigator may already have abandoned this animation
        let _ = self.tx.send(());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Completed,
    /// Sender dropped without completing
    Dropped,
}

/// Receiving half of a `Completion`
#[derive(Debug)]
pub struct CompletionWaiter {
    rx: oneshot::Receiver<()>,
}

impl CompletionWaiter {
    pub fn poll(&mut self) -> CompletionState {
        match self.rx.try_recv() {
            Ok(()) => CompletionState::Completed,
            Err(TryRecvError::Empty) => CompletionState::Pending,
            Err(TryRecvError::Closed) => CompletionState::Dropped,
        }
    }
}

/// Create a linked completion and waiter for `animation_id`
pub fn completion_pair(animation_id: &str) -> (Completion, CompletionWaiter) {
    let (tx, rx) = oneshot::channel();
    (
        Completion {
            animation_id: animation_id.to_string(),
            tx,
        },
        CompletionWaiter { rx },
    )
}

/// Parameters for one animated scroll
#[derive(Debug)]
pub struct ScrollRequest {
    pub duration: Duration,
    pub completion: Completion,
}

/// External scroll-physics controller
pub trait ScrollController {
    /// Animate to `position`, then call `request.completion.complete()`
    fn scroll_to(&mut self, position: f64, request: ScrollRequest);

    /// Move to `position` immediately, without animation
    fn jump_to(&mut self, position: f64);

    /// Current measured scroll offset
    fn scroll_offset(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// Advance physics by one frame
    fn update(&mut self) {}

    /// The viewport changed size
    fn resize(&mut self, _viewport_height: f64) {}
}
