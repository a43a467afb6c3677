//! Post-animation position verification and drift correction

use serde::Serialize;
use tracing::debug;

use super::controller::ScrollController;
use crate::config::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SyncReport {
    pub matches: bool,
    pub expected_index: usize,
    pub actual_index: usize,
    pub offset: f64,
    pub expected_offset: f64,
}

impl SyncReport {
    pub fn drift(&self) -> f64 {
        (self.offset - self.expected_offset).abs()
    }
}

#[derive(Debug, Clone)]
pub struct PositionSynchronizer {
    config: SyncConfig,
}

impl PositionSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Height of one section; falls back to the viewport height
    pub fn section_height<C: ScrollController + ?Sized>(&self, controller: &C) -> f64 {
        self.config
            .section_height
            .filter(|h| *h > 0.0)
            .unwrap_or_else(|| controller.viewport_height())
    }

    pub fn position_of<C: ScrollController + ?Sized>(&self, controller: &C, index: usize) -> f64 {
        index as f64 * self.section_height(controller)
    }

    /// Nearest section to the measured offset, clamped to `[0, count - 1]`
    pub fn measured_index<C: ScrollController + ?Sized>(&self, controller: &C, count: usize) -> usize {
        index_at(
            controller.scroll_offset(),
            self.section_height(controller),
            count,
        )
    }

    /// Compare the measured position against `expected`
    pub fn verify<C: ScrollController + ?Sized>(
        &self,
        controller: &C,
        expected: usize,
        count: usize,
    ) -> SyncReport {
        let actual_index = self.measured_index(controller, count);
        SyncReport {
            matches: actual_index == expected,
            expected_index: expected,
            actual_index,
            offset: controller.scroll_offset(),
            expected_offset: self.position_of(controller, expected),
        }
    }

    /// Verify and, when the position is off, jump straight to the expected
    /// section. Never re-enters the navigation pipeline.
    pub fn reconcile<C: ScrollController + ?Sized>(
        &self,
        controller: &mut C,
        expected: usize,
        count: usize,
    ) -> SyncReport {
        let report = self.verify(controller, expected, count);
        if !report.matches {
            controller.jump_to(report.expected_offset);
        } else if report.drift() > self.config.drift_tolerance {
            debug!(
                section = expected,
                drift = report.drift(),
                "Snapping to section after small drift"
            );
            controller.jump_to(report.expected_offset);
        }
        report
    }
}

/// Round an offset to the nearest section index
pub fn index_at(offset: f64, section_height: f64, count: usize) -> usize {
    if count == 0 || section_height <= 0.0 || !offset.is_finite() {
        return 0;
    }
    let raw = (offset / section_height).round();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(count - 1)
    }
}
