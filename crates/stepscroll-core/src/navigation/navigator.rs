//! Section navigator
//!
//! Orchestrates one transition at a time: requests from signals and external
//! callers funnel through `dispatch`, which consults the scheduler
//! synchronously before the scroll controller is ever touched. Completion is
//! observed on `tick`, paired with the tracker's watchdog.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::controller::{completion_pair, CompletionState, CompletionWaiter, ScrollController, ScrollRequest};
use super::fault::{BlockReason, NavigationFault};
use super::scheduler::CooldownScheduler;
use super::signal::{DeviceProfile, Direction, NavKey, RawInput, SignalEvent, SignalTranslator};
use super::sync::{PositionSynchronizer, SyncReport};
use super::tracker::{AnimationRecord, AnimationTracker};
use crate::config::{AppConfig, PendingPolicy};
use crate::{Error, Result};

/// Where a navigation request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// A caller asked for a section directly
    External,
    /// Derived from user input
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationRequest {
    pub target_index: usize,
    pub origin: Origin,
    pub requested_at: Instant,
}

/// Delivered once per completed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionChange {
    pub from: usize,
    pub to: usize,
    pub origin: Origin,
    pub animation_id: String,
}

/// Events published to an optional channel
#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorEvent {
    SectionChanged(SectionChange),
    Fault(NavigationFault),
}

/// What happened to a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Started { animation_id: String },
    /// Target is the current section
    AlreadyThere,
    /// A transition to the same target is already running
    AlreadyInFlight,
    /// Directional request past the first or last section
    AtBoundary,
    Blocked(BlockReason),
    /// Held as the single pending request
    Deferred(BlockReason),
    /// The raw input did not amount to a signal
    NoSignal,
}

impl NavigationOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, NavigationOutcome::Started { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Snapshot of everything needed to diagnose a misbehaving transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub is_animating: bool,
    pub is_scrolling: bool,
    pub cooldown_remaining_ms: u64,
    pub since_last_navigation_ms: Option<u64>,
    pub current_index: usize,
    pub section_count: usize,
    pub last_animation_id: Option<String>,
    pub in_flight_target: Option<usize>,
    pub pending_target: Option<usize>,
    pub scroll_offset: f64,
    pub section_height: f64,
}

struct InFlight {
    request: NavigationRequest,
    from: usize,
    animation_id: String,
    waiter: CompletionWaiter,
}

type Listener = Box<dyn FnMut(&SectionChange)>;

pub struct Navigator<C> {
    section_count: usize,
    current_index: usize,
    controller: C,
    scheduler: CooldownScheduler,
    tracker: AnimationTracker,
    translator: SignalTranslator,
    synchronizer: PositionSynchronizer,
    animation_duration: Duration,
    pending_policy: PendingPolicy,
    in_flight: Option<InFlight>,
    pending: Option<NavigationRequest>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    event_tx: Option<mpsc::UnboundedSender<NavigatorEvent>>,
}

impl<C: ScrollController> Navigator<C> {
    /// Create a navigator over `section_count` sections, starting at section 0
    pub fn new(section_count: usize, controller: C, config: &AppConfig) -> Result<Self> {
        if section_count == 0 {
            return Err(Error::InvalidSectionCount(section_count));
        }
        let nav = &config.navigation;
        Ok(Self {
            section_count,
            current_index: 0,
            controller,
            scheduler: CooldownScheduler::from_config(nav),
            tracker: AnimationTracker::new(nav.stuck_animation_timeout(), nav.history_capacity),
            translator: SignalTranslator::new(config.signal.clone(), DeviceProfile::default()),
            synchronizer: PositionSynchronizer::new(config.sync.clone()),
            animation_duration: nav.animation_duration(),
            pending_policy: nav.pending_policy,
            in_flight: None,
            pending: None,
            listeners: Vec::new(),
            next_subscription: 0,
            event_tx: None,
        })
    }

    pub fn with_device_profile(mut self, profile: DeviceProfile) -> Self {
        self.translator.set_profile(profile);
        self
    }

    /// Publish section changes and faults to a channel
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<NavigatorEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.section_count
    }

    pub fn is_first_section(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last_section(&self) -> bool {
        self.current_index == self.last_index()
    }

    /// True while a transition is in flight
    pub fn is_navigating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_navigate(&self) -> bool {
        self.in_flight.is_none() && self.scheduler.can_navigate()
    }

    /// True while there is time-based work for `tick` to do; hosts use this
    /// to pick a fast frame rate
    pub fn needs_update(&self) -> bool {
        self.in_flight.is_some() || self.pending.is_some() || self.scheduler.is_scrolling()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn scheduler(&self) -> &CooldownScheduler {
        &self.scheduler
    }

    pub fn tracker(&self) -> &AnimationTracker {
        &self.tracker
    }

    fn last_index(&self) -> usize {
        self.section_count - 1
    }

    /// Where the navigator is headed: the in-flight target, or the current section
    pub fn destination_index(&self) -> usize {
        self.in_flight
            .as_ref()
            .map(|f| f.request.target_index)
            .unwrap_or(self.current_index)
    }

    /// Subscribe to completed section changes
    pub fn on_section_change<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SectionChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Navigate to a section. Out-of-range indices are clamped.
    pub fn goto_section(&mut self, target: isize, origin: Origin) -> NavigationOutcome {
        self.refresh();
        let target_index = self.clamp_index(target);
        self.dispatch(NavigationRequest {
            target_index,
            origin,
            requested_at: Instant::now(),
        })
    }

    pub fn next_section(&mut self) -> NavigationOutcome {
        self.refresh();
        self.step(Direction::Forward, Origin::External)
    }

    pub fn prev_section(&mut self) -> NavigationOutcome {
        self.refresh();
        self.step(Direction::Backward, Origin::External)
    }

    /// Feed one raw device event through the translator
    pub fn handle_input(&mut self, raw: RawInput) -> NavigationOutcome {
        self.refresh();
        let outcome = match raw {
            RawInput::Key(NavKey::Home) => self.dispatch(self.request(0, Origin::Signal)),
            RawInput::Key(NavKey::End) => {
                self.dispatch(self.request(self.last_index(), Origin::Signal))
            }
            _ => match self.translator.translate(raw) {
                Some(signal) => self.handle_signal(signal),
                None => NavigationOutcome::NoSignal,
            },
        };

        // Recorded after the guard check so the first wheel event of a
        // gesture can still navigate; its momentum tail cannot
        if matches!(raw, RawInput::Wheel { .. }) {
            self.scheduler.note_scroll_activity();
        }
        outcome
    }

    /// Navigate one section in the signal's direction
    pub fn handle_signal(&mut self, signal: SignalEvent) -> NavigationOutcome {
        debug!(
            direction = ?signal.direction,
            source = ?signal.source,
            magnitude = signal.magnitude,
            "Signal"
        );
        self.step(signal.direction, Origin::Signal)
    }

    /// Cooperative heartbeat: advance the controller, observe completion,
    /// run the watchdog and scroll debounce, then release a pending request
    pub fn tick(&mut self) {
        self.controller.update();
        self.refresh();
        self.dispatch_pending();
    }

    /// The viewport changed size; keep the current section aligned
    pub fn resize(&mut self, viewport_height: f64) {
        self.controller.resize(viewport_height);
        if self.in_flight.is_none() {
            let position = self.synchronizer.position_of(&self.controller, self.current_index);
            self.controller.jump_to(position);
        }
    }

    /// Verify the measured position against the current section and correct it.
    ///
    /// Returns `None` without touching the controller while a transition is
    /// in flight, since the offset is expected to lie between sections then.
    pub fn verify_position(&mut self) -> Option<SyncReport> {
        if let Some(in_flight) = &self.in_flight {
            debug!(
                animation_id = %in_flight.animation_id,
                "Skipping position check during transition"
            );
            return None;
        }
        let report =
            self.synchronizer
                .reconcile(&mut self.controller, self.current_index, self.section_count);
        if !report.matches {
            let fault = NavigationFault::StateDesync {
                expected: report.expected_index,
                actual: report.actual_index,
            };
            warn!(offset = report.offset, expected_offset = report.expected_offset, "{}", fault);
            self.emit(NavigatorEvent::Fault(fault));
        }
        Some(report)
    }

    pub fn debug_info(&self) -> DebugInfo {
        let scheduler = self.scheduler.debug_info();
        DebugInfo {
            is_animating: scheduler.is_animating,
            is_scrolling: scheduler.is_scrolling,
            cooldown_remaining_ms: scheduler.cooldown_remaining_ms,
            since_last_navigation_ms: scheduler.since_last_navigation_ms,
            current_index: self.current_index,
            section_count: self.section_count,
            last_animation_id: self.tracker.last_animation_id().map(str::to_string),
            in_flight_target: self.in_flight.as_ref().map(|f| f.request.target_index),
            pending_target: self.pending.as_ref().map(|r| r.target_index),
            scroll_offset: self.controller.scroll_offset(),
            section_height: self.synchronizer.section_height(&self.controller),
        }
    }

    fn request(&self, target_index: usize, origin: Origin) -> NavigationRequest {
        NavigationRequest {
            target_index,
            origin,
            requested_at: Instant::now(),
        }
    }

    fn clamp_index(&self, requested: isize) -> usize {
        let last = self.last_index();
        let clamped = if requested < 0 {
            0
        } else {
            (requested as usize).min(last)
        };
        if requested < 0 || requested as usize > last {
            let fault = NavigationFault::InvalidSectionIndex {
                requested,
                count: self.section_count,
                clamped,
            };
            debug!("{}", fault);
        }
        clamped
    }

    fn step(&mut self, direction: Direction, origin: Origin) -> NavigationOutcome {
        let base = self.destination_index();
        let target_index = match direction {
            Direction::Forward if base < self.last_index() => base + 1,
            Direction::Backward if base > 0 => base - 1,
            _ => {
                debug!(?direction, section = base, "Ignoring signal at boundary");
                return NavigationOutcome::AtBoundary;
            }
        };
        self.dispatch(self.request(target_index, origin))
    }

    fn block_reason(&self) -> Option<BlockReason> {
        if self.in_flight.is_some() || self.scheduler.is_animating() {
            Some(BlockReason::Animating)
        } else if self.scheduler.is_scrolling() {
            Some(BlockReason::Scrolling)
        } else if !self.scheduler.can_navigate() {
            Some(BlockReason::Cooldown)
        } else {
            None
        }
    }

    fn dispatch(&mut self, request: NavigationRequest) -> NavigationOutcome {
        let target = request.target_index;

        if target == self.current_index {
            return NavigationOutcome::AlreadyThere;
        }
        // Re-entry for a transition already underway must not start another
        if let Some(in_flight) = &self.in_flight {
            if in_flight.request.target_index == target {
                debug!(
                    target,
                    animation_id = %in_flight.animation_id,
                    "Already navigating to requested section"
                );
                return NavigationOutcome::AlreadyInFlight;
            }
        }

        if let Some(reason) = self.block_reason() {
            let fault = NavigationFault::NavigationBlocked { target, reason };
            debug!(origin = ?request.origin, "{}", fault);
            self.emit(NavigatorEvent::Fault(fault));

            return match self.pending_policy {
                PendingPolicy::Drop => NavigationOutcome::Blocked(reason),
                PendingPolicy::SinglePending => {
                    if let Some(replaced) = self.pending.replace(request) {
                        debug!(
                            replaced = replaced.target_index,
                            target, "Replacing pending navigation request"
                        );
                    }
                    NavigationOutcome::Deferred(reason)
                }
            };
        }

        self.start_transition(request)
    }

    fn start_transition(&mut self, request: NavigationRequest) -> NavigationOutcome {
        let from = self.current_index;
        let to = request.target_index;
        let animation_id = self.tracker.start(&mut self.scheduler, from, to);
        let (completion, waiter) = completion_pair(&animation_id);
        let position = self.synchronizer.position_of(&self.controller, to);

        info!(
            animation_id = %animation_id,
            origin = ?request.origin,
            position,
            "Navigating to section {}",
            to
        );

        self.in_flight = Some(InFlight {
            request,
            from,
            animation_id: animation_id.clone(),
            waiter,
        });
        self.controller.scroll_to(
            position,
            ScrollRequest {
                duration: self.animation_duration,
                completion,
            },
        );

        NavigationOutcome::Started { animation_id }
    }

    fn refresh(&mut self) {
        self.poll_completion();
        self.run_watchdog();
        self.scheduler.poll();
    }

    fn poll_completion(&mut self) {
        let state = match self.in_flight.as_mut() {
            Some(in_flight) => in_flight.waiter.poll(),
            None => return,
        };
        match state {
            CompletionState::Pending => {}
            CompletionState::Completed => {
                if let Some(in_flight) = self.in_flight.take() {
                    self.finish_transition(in_flight);
                }
            }
            CompletionState::Dropped => {
                if let Some(in_flight) = self.in_flight.take() {
                    if let Some(record) = self.tracker.abandon(&mut self.scheduler) {
                        self.recover(in_flight, record, true);
                    }
                }
            }
        }
    }

    fn run_watchdog(&mut self) {
        if self.in_flight.is_none() {
            return;
        }
        if let Some(record) = self.tracker.check_watchdog(&mut self.scheduler) {
            if let Some(in_flight) = self.in_flight.take() {
                self.recover(in_flight, record, false);
            }
        }
    }

    fn dispatch_pending(&mut self) {
        if self.in_flight.is_some() || !self.scheduler.can_navigate() {
            return;
        }
        if let Some(request) = self.pending.take() {
            debug!(target = request.target_index, "Dispatching pending navigation request");
            self.dispatch(request);
        }
    }

    fn finish_transition(&mut self, in_flight: InFlight) {
        self.tracker.end(&mut self.scheduler, &in_flight.animation_id);
        self.commit(
            in_flight.from,
            in_flight.request.target_index,
            in_flight.request.origin,
            in_flight.animation_id,
        );
        if self.synchronizer.is_enabled() {
            self.verify_position();
        }
    }

    /// Settle an abandoned transition on the section the measured offset
    /// rounds to, then snap there.
    ///
    /// The adopted section is not necessarily `from` or the target: a jump
    /// from 0 to 4 abandoned half way settles on 2. Only completed
    /// transitions are guaranteed to land on the requested section.
    fn recover(&mut self, in_flight: InFlight, record: AnimationRecord, controller_gave_up: bool) {
        let fault = NavigationFault::AnimationStuck {
            animation_id: record.id.clone(),
            elapsed_ms: record.elapsed().as_millis() as u64,
            controller_gave_up,
        };
        warn!("{}", fault);
        self.emit(NavigatorEvent::Fault(fault));

        let offset = self.controller.scroll_offset();
        let resolved = self
            .synchronizer
            .measured_index(&self.controller, self.section_count);

        info!(section = resolved, offset, "Recovered from abandoned animation");
        self.commit(
            in_flight.from,
            resolved,
            in_flight.request.origin,
            in_flight.animation_id,
        );
        let position = self.synchronizer.position_of(&self.controller, resolved);
        self.controller.jump_to(position);
    }

    fn commit(&mut self, from: usize, to: usize, origin: Origin, animation_id: String) {
        self.current_index = to;
        if from == to {
            return;
        }
        info!(from, to, animation_id = %animation_id, "Section changed");
        let change = SectionChange {
            from,
            to,
            origin,
            animation_id,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
        self.emit(NavigatorEvent::SectionChanged(change));
    }

    fn emit(&mut self, event: NavigatorEvent) {
        let failed = self
            .event_tx
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_err());
        if failed {
            warn!("Failed to send navigator event: receiver dropped");
            self.event_tx = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::navigation::controller::testing::RecordingController;
    use tokio::time::advance;

    const VIEWPORT: f64 = 800.0;

    fn navigator(count: usize) -> Navigator<RecordingController> {
        Navigator::new(count, RecordingController::new(VIEWPORT), &AppConfig::default()).unwrap()
    }

    fn record_changes(nav: &mut Navigator<RecordingController>) -> Rc<RefCell<Vec<SectionChange>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        nav.on_section_change(move |change| sink.borrow_mut().push(change.clone()));
        changes
    }

    fn wheel_down() -> RawInput {
        RawInput::Wheel { delta_y: 120.0 }
    }

    fn finish(nav: &mut Navigator<RecordingController>) {
        assert!(nav.controller_mut().finish());
        nav.tick();
    }

    #[test]
    fn test_zero_sections_rejected() {
        let result = Navigator::new(0, RecordingController::new(VIEWPORT), &AppConfig::default());
        assert!(matches!(result, Err(Error::InvalidSectionCount(0))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_goto_current_is_idempotent() {
        let mut nav = navigator(5);
        assert_eq!(nav.goto_section(0, Origin::External), NavigationOutcome::AlreadyThere);
        assert!(nav.controller().scrolls.is_empty());
        assert!(nav.tracker().active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wheel_burst_then_next_transition() {
        let mut nav = navigator(5);
        let changes = record_changes(&mut nav);

        assert!(nav.handle_input(wheel_down()).is_started());
        advance(Duration::from_millis(50)).await;
        assert_eq!(
            nav.handle_input(wheel_down()),
            NavigationOutcome::Blocked(BlockReason::Animating)
        );
        advance(Duration::from_millis(50)).await;
        assert!(!nav.handle_input(wheel_down()).is_started());

        assert_eq!(nav.controller().animation_ids(), vec!["section-0-to-1"]);
        assert_eq!(nav.controller().scrolls[0].0, VIEWPORT);
        assert_eq!(nav.controller().scrolls[0].1, Duration::from_millis(1200));

        advance(Duration::from_millis(1100)).await;
        finish(&mut nav);
        assert_eq!(nav.current_index(), 1);
        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(changes.borrow()[0].animation_id, "section-0-to-1");

        advance(Duration::from_millis(201)).await;
        let outcome = nav.handle_input(wheel_down());
        assert_eq!(
            outcome,
            NavigationOutcome::Started {
                animation_id: "section-1-to-2".to_string()
            }
        );
        finish(&mut nav);
        assert_eq!(nav.current_index(), 2);
        assert_eq!(changes.borrow().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_blocks_after_completion() {
        let mut nav = navigator(5);
        nav.next_section();
        finish(&mut nav);

        assert_eq!(
            nav.handle_input(RawInput::Key(NavKey::ArrowDown)),
            NavigationOutcome::Blocked(BlockReason::Cooldown)
        );
        advance(Duration::from_millis(201)).await;
        assert!(nav.handle_input(RawInput::Key(NavKey::ArrowDown)).is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_momentum_tail_blocks_until_scroll_settles() {
        let mut nav = navigator(5);
        nav.handle_input(wheel_down());
        finish(&mut nav);
        advance(Duration::from_millis(300)).await;

        // Sub-tolerance momentum still counts as scrolling
        assert_eq!(nav.handle_input(RawInput::Wheel { delta_y: 10.0 }), NavigationOutcome::NoSignal);
        assert_eq!(
            nav.handle_input(wheel_down()),
            NavigationOutcome::Blocked(BlockReason::Scrolling)
        );
        advance(Duration::from_millis(150)).await;
        assert!(nav.handle_input(wheel_down()).is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_indices_clamp() {
        let mut low = navigator(5);
        assert_eq!(low.goto_section(-5, Origin::External), NavigationOutcome::AlreadyThere);

        let mut high = navigator(5);
        let mut last = navigator(5);
        assert_eq!(
            high.goto_section(999, Origin::External),
            last.goto_section(4, Origin::External)
        );
        assert_eq!(high.controller().scrolls[0].0, 4.0 * VIEWPORT);
        assert_eq!(high.controller().animation_ids(), vec!["section-0-to-4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_after_last_is_rejected() {
        let mut nav = navigator(5);
        assert!(nav.goto_section(4, Origin::External).is_started());
        assert_eq!(nav.next_section(), NavigationOutcome::AtBoundary);
        finish(&mut nav);
        assert_eq!(nav.current_index(), 4);
        assert!(nav.is_last_section());

        advance(Duration::from_millis(500)).await;
        assert_eq!(nav.next_section(), NavigationOutcome::AtBoundary);
        assert_eq!(nav.controller().scrolls.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backward_at_first_section_is_ignored() {
        let mut nav = navigator(3);
        assert!(nav.is_first_section());
        assert_eq!(
            nav.handle_input(RawInput::Key(NavKey::ArrowUp)),
            NavigationOutcome::AtBoundary
        );
        assert!(nav.controller().scrolls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_request_then_conflicting_signal_converges() {
        let mut nav = navigator(5);
        let changes = record_changes(&mut nav);

        assert!(nav.goto_section(3, Origin::External).is_started());
        assert_eq!(
            nav.handle_input(RawInput::Key(NavKey::ArrowUp)),
            NavigationOutcome::Blocked(BlockReason::Animating)
        );
        finish(&mut nav);

        assert_eq!(nav.current_index(), 3);
        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(changes.borrow()[0].origin, Origin::External);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_external_request_does_not_reenter() {
        let mut nav = navigator(5);
        assert!(nav.goto_section(2, Origin::External).is_started());
        assert_eq!(
            nav.goto_section(2, Origin::External),
            NavigationOutcome::AlreadyInFlight
        );
        finish(&mut nav);
        // The host echoing the new index back is a no-op too
        assert_eq!(nav.goto_section(2, Origin::External), NavigationOutcome::AlreadyThere);
        assert_eq!(nav.controller().scrolls.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_recovers_missing_completion() {
        let mut nav = navigator(5);
        let (tx, mut rx) = mpsc::unbounded_channel();
        nav = nav.with_event_sender(tx);
        let changes = record_changes(&mut nav);

        nav.goto_section(1, Origin::External);
        advance(Duration::from_millis(2999)).await;
        nav.tick();
        assert!(!nav.can_navigate());

        advance(Duration::from_millis(1)).await;
        nav.tick();
        assert!(nav.can_navigate());
        // The controller never moved, so the navigator stays put
        assert_eq!(nav.current_index(), 0);
        assert!(changes.borrow().is_empty());
        assert_eq!(nav.controller().jumps, vec![0.0]);

        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            NavigatorEvent::Fault(NavigationFault::AnimationStuck {
                controller_gave_up: false,
                ..
            })
        ));

        // A late completion for the abandoned animation is ignored
        assert!(nav.controller_mut().finish());
        nav.tick();
        assert_eq!(nav.current_index(), 0);
        assert!(changes.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_adopts_target_when_scroll_arrived() {
        let mut nav = navigator(5);
        let changes = record_changes(&mut nav);

        nav.goto_section(2, Origin::External);
        nav.controller_mut().offset = 2.0 * VIEWPORT - 30.0;
        advance(Duration::from_millis(3000)).await;
        nav.tick();

        assert_eq!(nav.current_index(), 2);
        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(nav.controller().offset, 2.0 * VIEWPORT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_adopts_intermediate_section() {
        let mut nav = navigator(5);
        nav.goto_section(4, Origin::External);
        nav.controller_mut().offset = 2.0 * VIEWPORT + 100.0;
        advance(Duration::from_millis(3000)).await;
        nav.tick();

        assert_eq!(nav.current_index(), 2);
        assert_eq!(nav.controller().offset, 2.0 * VIEWPORT);
        assert_eq!(
            nav.tracker().history().last().and_then(|r| r.outcome),
            Some(crate::navigation::tracker::AnimationOutcome::Abandoned)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_during_transition_leaves_it_alone() {
        let mut nav = navigator(5);
        let (tx, mut rx) = mpsc::unbounded_channel();
        nav = nav.with_event_sender(tx);
        let changes = record_changes(&mut nav);

        nav.goto_section(2, Origin::External);
        advance(Duration::from_millis(600)).await;
        nav.controller_mut().offset = 900.0;

        assert_eq!(nav.verify_position(), None);
        assert!(nav.controller().jumps.is_empty());
        assert!(rx.try_recv().is_err());
        assert!(nav.is_navigating());

        finish(&mut nav);
        assert_eq!(nav.current_index(), 2);
        assert_eq!(changes.borrow().len(), 1);
        assert!(matches!(rx.try_recv(), Ok(NavigatorEvent::SectionChanged(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_at_rest_corrects_drift() {
        let mut nav = navigator(5);
        nav.controller_mut().offset = VIEWPORT + 20.0;

        let report = nav.verify_position().unwrap();
        assert!(!report.matches);
        assert_eq!(report.actual_index, 1);
        assert_eq!(nav.controller().jumps, vec![0.0]);
        assert_eq!(nav.current_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_profile_raises_wheel_tolerance() {
        let small_wheel = RawInput::Wheel { delta_y: 80.0 };
        assert!(navigator(5).handle_input(small_wheel).is_started());

        let touch = DeviceProfile {
            touch: true,
            ios: false,
        };
        let mut nav = navigator(5).with_device_profile(touch);
        assert_eq!(nav.handle_input(small_wheel), NavigationOutcome::NoSignal);
        assert!(nav.controller().scrolls.is_empty());

        let mut nav = navigator(5).with_device_profile(touch);
        assert!(nav.handle_input(RawInput::Wheel { delta_y: 100.0 }).is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ios_profile_damps_wheel_delta() {
        let small_wheel = RawInput::Wheel { delta_y: 80.0 };
        let ios = DeviceProfile {
            touch: false,
            ios: true,
        };
        let mut nav = navigator(5).with_device_profile(ios);
        assert_eq!(nav.handle_input(small_wheel), NavigationOutcome::NoSignal);
        assert!(nav.controller().scrolls.is_empty());

        let mut nav = navigator(5).with_device_profile(ios);
        assert!(nav.handle_input(RawInput::Wheel { delta_y: 120.0 }).is_started());
        assert_eq!(nav.destination_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_goto_current_while_in_flight_is_noop() {
        let mut nav = navigator(5);
        nav.goto_section(3, Origin::External);
        assert_eq!(nav.goto_section(0, Origin::External), NavigationOutcome::AlreadyThere);
        assert_eq!(nav.destination_index(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_giving_up_recovers_immediately() {
        let mut nav = navigator(5);
        let (tx, mut rx) = mpsc::unbounded_channel();
        nav = nav.with_event_sender(tx);

        nav.goto_section(1, Origin::External);
        nav.controller_mut().give_up();
        nav.tick();

        assert!(!nav.is_navigating());
        assert!(nav.can_navigate());
        assert!(matches!(
            rx.try_recv().unwrap(),
            NavigatorEvent::Fault(NavigationFault::AnimationStuck {
                controller_gave_up: true,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_desync_is_corrected_with_jump() {
        let mut nav = navigator(5);
        let (tx, mut rx) = mpsc::unbounded_channel();
        nav = nav.with_event_sender(tx);

        nav.goto_section(1, Origin::External);
        nav.controller_mut().finish_at(1700.0);
        nav.tick();

        assert_eq!(nav.current_index(), 1);
        assert_eq!(nav.controller().jumps, vec![VIEWPORT]);
        assert_eq!(nav.controller().scrolls.len(), 1);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(events[0], NavigatorEvent::SectionChanged(_)));
        assert_eq!(
            events[1],
            NavigatorEvent::Fault(NavigationFault::StateDesync {
                expected: 1,
                actual: 2
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_pending_policy() {
        let mut config = AppConfig::default();
        config.navigation.pending_policy = PendingPolicy::SinglePending;
        let mut nav = Navigator::new(5, RecordingController::new(VIEWPORT), &config).unwrap();

        assert!(nav.goto_section(1, Origin::External).is_started());
        assert_eq!(
            nav.goto_section(2, Origin::External),
            NavigationOutcome::Deferred(BlockReason::Animating)
        );
        assert_eq!(
            nav.goto_section(3, Origin::External),
            NavigationOutcome::Deferred(BlockReason::Animating)
        );
        assert_eq!(nav.debug_info().pending_target, Some(3));

        finish(&mut nav);
        assert_eq!(nav.current_index(), 1);
        // Still cooling down
        assert_eq!(nav.controller().scrolls.len(), 1);

        advance(Duration::from_millis(201)).await;
        nav.tick();
        assert_eq!(
            nav.controller().animation_ids(),
            vec!["section-0-to-1", "section-1-to-3"]
        );
        finish(&mut nav);
        assert_eq!(nav.current_index(), 3);
        assert_eq!(nav.debug_info().pending_target, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_and_end_keys() {
        let mut nav = navigator(5);
        assert_eq!(
            nav.handle_input(RawInput::Key(NavKey::End)),
            NavigationOutcome::Started {
                animation_id: "section-0-to-4".to_string()
            }
        );
        finish(&mut nav);
        advance(Duration::from_millis(201)).await;
        assert_eq!(
            nav.handle_input(RawInput::Key(NavKey::Home)),
            NavigationOutcome::Started {
                animation_id: "section-4-to-0".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_swipe_navigates() {
        let mut nav = navigator(5);
        nav.handle_input(RawInput::TouchStart { y: 600.0 });
        nav.handle_input(RawInput::TouchMove { y: 450.0 });
        assert!(nav.handle_input(RawInput::TouchEnd { y: 300.0 }).is_started());
        assert_eq!(nav.destination_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debug_info() {
        let mut nav = navigator(5);
        nav.goto_section(2, Origin::External);
        let info = nav.debug_info();
        assert!(info.is_animating);
        assert!(!info.is_scrolling);
        assert_eq!(info.current_index, 0);
        assert_eq!(info.in_flight_target, Some(2));
        assert_eq!(info.last_animation_id.as_deref(), Some("section-0-to-2"));
        assert_eq!(info.section_height, VIEWPORT);

        finish(&mut nav);
        let info = nav.debug_info();
        assert!(!info.is_animating);
        assert_eq!(info.cooldown_remaining_ms, 200);
        assert_eq!(info.current_index, 2);
        assert_eq!(info.in_flight_target, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe() {
        let mut nav = navigator(5);
        let hits = Rc::new(RefCell::new(0));
        let sink = hits.clone();
        let id = nav.on_section_change(move |_| *sink.borrow_mut() += 1);
        assert!(nav.unsubscribe(id));
        assert!(!nav.unsubscribe(id));

        nav.next_section();
        finish(&mut nav);
        assert_eq!(*hits.borrow(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_realigns_current_section() {
        let mut nav = navigator(5);
        nav.goto_section(2, Origin::External);
        finish(&mut nav);

        nav.resize(600.0);
        assert_eq!(nav.controller().offset, 1200.0);
        assert_eq!(nav.debug_info().section_height, 600.0);
    }
}
