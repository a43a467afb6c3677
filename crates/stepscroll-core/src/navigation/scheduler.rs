//! Debounce/cooldown scheduler
//!
//! Single source of truth for "is it safe to navigate right now". Three
//! independent guards must all pass: no transition animating, no raw scroll
//! activity, and the post-transition cooldown elapsed.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::NavigationConfig;

/// Mutable guard state owned by one scheduler
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub is_animating: bool,
    pub is_scrolling: bool,
    /// When the last transition finished
    pub last_navigation_at: Option<Instant>,
    /// Raw scroll activity ends once this passes without new activity
    scroll_end_deadline: Option<Instant>,
    /// Id passed to the last `mark_animation_start`
    animation_id: Option<String>,
}

/// Point-in-time view of the scheduler for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerSnapshot {
    pub is_animating: bool,
    pub is_scrolling: bool,
    pub cooldown_remaining_ms: u64,
    pub since_last_navigation_ms: Option<u64>,
    pub animation_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CooldownScheduler {
    cooldown: Duration,
    scroll_end_debounce: Duration,
    state: SchedulerState,
}

impl CooldownScheduler {
    pub fn new(cooldown: Duration, scroll_end_debounce: Duration) -> Self {
        Self {
            cooldown,
            scroll_end_debounce,
            state: SchedulerState::default(),
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.cooldown(), config.scroll_end_debounce())
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    #[inline]
    pub fn is_scrolling(&self) -> bool {
        self.state.is_scrolling
    }

    /// True only if nothing is animating, nothing is scrolling and the
    /// cooldown since the last transition has strictly elapsed
    pub fn can_navigate(&self) -> bool {
        !self.state.is_animating && !self.state.is_scrolling && self.cooldown_elapsed()
    }

    fn cooldown_elapsed(&self) -> bool {
        match self.state.last_navigation_at {
            Some(at) => at.elapsed() > self.cooldown,
            None => true,
        }
    }

    /// Time left before the cooldown guard passes
    pub fn cooldown_remaining(&self) -> Duration {
        match self.state.last_navigation_at {
            Some(at) => self.cooldown.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }

    pub fn mark_animation_start(&mut self, id: &str) {
        trace!(animation_id = id, "Animation start");
        self.state.is_animating = true;
        self.state.animation_id = Some(id.to_string());
    }

    pub fn mark_animation_end(&mut self, id: &str) {
        trace!(animation_id = id, "Animation end");
        self.state.is_animating = false;
        self.state.last_navigation_at = Some(Instant::now());
    }

    /// Clear the animating flag without starting a cooldown window
    pub fn force_clear_animation(&mut self) {
        debug!(animation_id = ?self.state.animation_id, "Animation flag force-cleared");
        self.state.is_animating = false;
    }

    pub fn mark_scroll_start(&mut self) {
        self.state.is_scrolling = true;
    }

    pub fn mark_scroll_end(&mut self) {
        self.state.is_scrolling = false;
        self.state.scroll_end_deadline = None;
    }

    /// Record raw scroll activity; scrolling ends after a quiet debounce period
    pub fn note_scroll_activity(&mut self) {
        if !self.state.is_scrolling {
            self.mark_scroll_start();
        }
        self.state.scroll_end_deadline = Some(Instant::now() + self.scroll_end_debounce);
    }

    /// Advance time-based state. Returns true when raw scrolling just ended.
    pub fn poll(&mut self) -> bool {
        match self.state.scroll_end_deadline {
            Some(deadline) if Instant::now() >= deadline => {
                debug!("Scroll activity settled");
                self.mark_scroll_end();
                true
            }
            _ => false,
        }
    }

    /// Snapshot of all flags and timestamps
    pub fn debug_info(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            is_animating: self.state.is_animating,
            is_scrolling: self.state.is_scrolling,
            cooldown_remaining_ms: self.cooldown_remaining().as_millis() as u64,
            since_last_navigation_ms: self
                .state
                .last_navigation_at
                .map(|at| at.elapsed().as_millis() as u64),
            animation_id: self.state.animation_id.clone(),
        }
    }
}
