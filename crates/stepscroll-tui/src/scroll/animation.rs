//! Scroll animation controller
//!
//! Combines easing and timing to move the viewport between sections. The
//! navigator hands each animated scroll a `Completion`; `update()` fires it
//! on the frame the animation lands.

use std::time::Duration;

use stepscroll_core::navigation::{Completion, ScrollController, ScrollRequest};
use tokio::time::Instant;
use tracing::{debug, trace};

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp, progress, to_row};

#[derive(Debug)]
struct ActiveAnimation {
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
    completion: Option<Completion>,
}

/// Animated viewport over a vertical stack of sections
///
/// Call `update()` every frame while `is_animating()` is true; the navigator
/// does this through `ScrollController::update` on each tick.
#[derive(Debug)]
pub struct AnimatedScroller {
    animation: Option<ActiveAnimation>,
    easing: EasingType,
    offset: f64,
    viewport_height: f64,
}

impl AnimatedScroller {
    pub fn new(easing: EasingType, viewport_height: f64) -> Self {
        Self {
            animation: None,
            easing,
            offset: 0.0,
            viewport_height,
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Where the viewport will rest once the current animation lands
    pub fn target_offset(&self) -> f64 {
        self.animation.as_ref().map(|a| a.to).unwrap_or(self.offset)
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current offset rounded to a terminal row
    #[inline]
    pub fn row(&self) -> u16 {
        to_row(self.offset)
    }

    /// Stop where we are. An in-flight completion is dropped, which the
    /// navigator treats as the controller giving up.
    pub fn cancel(&mut self) {
        if let Some(animation) = self.animation.take() {
            debug!(
                animation_id = animation.completion.as_ref().map(|c| c.animation_id()),
                offset = self.offset,
                "Scroll animation cancelled"
            );
        }
    }
}

impl ScrollController for AnimatedScroller {
    fn scroll_to(&mut self, position: f64, request: ScrollRequest) {
        let to = position.max(0.0);
        // A new target supersedes whatever was running
        self.cancel();

        if request.duration.is_zero() || (to - self.offset).abs() < f64::EPSILON {
            self.offset = to;
            request.completion.complete();
            return;
        }

        trace!(
            animation_id = request.completion.animation_id(),
            from = self.offset,
            to,
            "Scroll animation started"
        );
        self.animation = Some(ActiveAnimation {
            start: Instant::now(),
            from: self.offset,
            to,
            duration: request.duration,
            easing: self.easing,
            completion: Some(request.completion),
        });
    }

    fn jump_to(&mut self, position: f64) {
        self.cancel();
        self.offset = position.max(0.0);
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn update(&mut self) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };

        if is_complete(animation.start, animation.duration) {
            self.offset = animation.to;
            if let Some(completion) = animation.completion.take() {
                trace!(animation_id = completion.animation_id(), "Scroll animation landed");
                completion.complete();
            }
            self.animation = None;
        } else {
            let t = progress(animation.start, animation.duration);
            self.offset = lerp(animation.from, animation.to, animation.easing.apply(t));
        }
    }

    fn resize(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
    }
}
