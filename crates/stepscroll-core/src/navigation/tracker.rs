//! Animation lifecycle tracker
//!
//! Owns the single in-flight `AnimationRecord` and the watchdog that abandons
//! it when the completion never arrives.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::scheduler::CooldownScheduler;

/// How an animation record left the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationOutcome {
    Completed,
    /// Force-cleared by the watchdog or because the controller gave up
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct AnimationRecord {
    pub id: String,
    pub from_index: usize,
    pub to_index: usize,
    pub started_at: Instant,
    pub ended_at: Option<Instant>,
    pub outcome: Option<AnimationOutcome>,
}

impl AnimationRecord {
    pub fn elapsed(&self) -> Duration {
        self.ended_at
            .map(|end| end.duration_since(self.started_at))
            .unwrap_or_else(|| self.started_at.elapsed())
    }
}

/// Identifier for a transition between two sections
pub fn animation_id(from: usize, to: usize) -> String {
    format!("section-{}-to-{}", from, to)
}

#[derive(Debug)]
pub struct AnimationTracker {
    active: Option<AnimationRecord>,
    history: VecDeque<AnimationRecord>,
    history_capacity: usize,
    stuck_timeout: Duration,
}

impl AnimationTracker {
    pub fn new(stuck_timeout: Duration, history_capacity: usize) -> Self {
        Self {
            active: None,
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            stuck_timeout,
        }
    }

    pub fn active(&self) -> Option<&AnimationRecord> {
        self.active.as_ref()
    }

    /// Finished records, oldest first
    pub fn history(&self) -> impl Iterator<Item = &AnimationRecord> {
        self.history.iter()
    }

    /// Id of the in-flight animation, or of the most recently finished one
    pub fn last_animation_id(&self) -> Option<&str> {
        self.active
            .as_ref()
            .or_else(|| self.history.back())
            .map(|record| record.id.as_str())
    }

    pub fn stuck_timeout(&self) -> Duration {
        self.stuck_timeout
    }

    /// Begin tracking a transition. Any record still active is archived as
    /// abandoned first; upstream single-flight checks should prevent that.
    pub fn start(
        &mut self,
        scheduler: &mut CooldownScheduler,
        from_index: usize,
        to_index: usize,
    ) -> String {
        if let Some(previous) = self.active.take() {
            warn!(animation_id = %previous.id, "Starting an animation while another is active");
            self.archive(previous, AnimationOutcome::Abandoned);
        }

        let id = animation_id(from_index, to_index);
        scheduler.mark_animation_start(&id);
        debug!(animation_id = %id, "Animation started");
        self.active = Some(AnimationRecord {
            id: id.clone(),
            from_index,
            to_index,
            started_at: Instant::now(),
            ended_at: None,
            outcome: None,
        });
        id
    }

    /// Finish the active animation. Ends for unknown or stale ids are ignored.
    pub fn end(&mut self, scheduler: &mut CooldownScheduler, id: &str) -> Option<AnimationRecord> {
        match self.active.as_ref() {
            Some(record) if record.id == id => {}
            _ => {
                debug!(animation_id = id, "Ignoring end for an animation that is not active");
                return None;
            }
        }
        let record = self.active.take()?;
        scheduler.mark_animation_end(id);
        debug!(animation_id = id, elapsed_ms = record.elapsed().as_millis() as u64, "Animation ended");
        Some(self.archive(record, AnimationOutcome::Completed))
    }

    /// Abandon the active animation and clear the scheduler's animating flag
    pub fn abandon(&mut self, scheduler: &mut CooldownScheduler) -> Option<AnimationRecord> {
        let record = self.active.take()?;
        scheduler.force_clear_animation();
        Some(self.archive(record, AnimationOutcome::Abandoned))
    }

    /// True when `id` is active and has run longer than `threshold`
    pub fn is_stuck(&self, id: &str, threshold: Duration) -> bool {
        self.active
            .as_ref()
            .is_some_and(|record| record.id == id && record.started_at.elapsed() >= threshold)
    }

    /// Watchdog check: force-clears an animation older than the stuck timeout
    pub fn check_watchdog(&mut self, scheduler: &mut CooldownScheduler) -> Option<AnimationRecord> {
        let id = self.active.as_ref()?.id.clone();
        if !self.is_stuck(&id, self.stuck_timeout) {
            return None;
        }
        warn!(
            animation_id = %id,
            timeout_ms = self.stuck_timeout.as_millis() as u64,
            "Animation stuck, forcing completion state"
        );
        self.abandon(scheduler)
    }

    fn archive(&mut self, mut record: AnimationRecord, outcome: AnimationOutcome) -> AnimationRecord {
        record.ended_at = Some(Instant::now());
        record.outcome = Some(outcome);
        if self.history_capacity > 0 {
            if self.history.len() == self.history_capacity {
                self.history.pop_front();
            }
            self.history.push_back(record.clone());
        }
        record
    }
}
