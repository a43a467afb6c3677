//! Signal translator
//!
//! Converts raw device input into a normalized directional signal. Small
//! deltas are discarded as noise; magnitude is kept for diagnostics only and
//! never drives proportional movement.

use serde::Serialize;
use tracing::trace;

use crate::config::SignalConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Wheel,
    Touch,
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalEvent {
    pub direction: Direction,
    pub magnitude: f64,
    pub source: SignalSource,
}

/// Navigation keys understood by the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    PageDown,
    PageUp,
    Space,
    ShiftSpace,
    Home,
    End,
}

/// Raw device events as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// Positive delta scrolls toward later sections
    Wheel { delta_y: f64 },
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd { y: f64 },
    Key(NavKey),
}

/// Host device characteristics that change the tolerance policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    pub touch: bool,
    pub ios: bool,
}

#[derive(Debug, Default)]
struct TouchTrack {
    start_y: f64,
    last_y: f64,
}

#[derive(Debug)]
pub struct SignalTranslator {
    config: SignalConfig,
    profile: DeviceProfile,
    touch: Option<TouchTrack>,
}

impl SignalTranslator {
    pub fn new(config: SignalConfig, profile: DeviceProfile) -> Self {
        Self {
            config,
            profile,
            touch: None,
        }
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: DeviceProfile) {
        self.profile = profile;
        self.touch = None;
    }

    /// Tolerance applied to the given source
    pub fn tolerance(&self, source: SignalSource) -> f64 {
        match source {
            SignalSource::Wheel if self.profile.touch => self.config.touch_tolerance,
            SignalSource::Wheel => self.config.wheel_tolerance,
            SignalSource::Touch => self.config.touch_tolerance,
            SignalSource::Keyboard => 0.0,
        }
    }

    /// Translate a raw event. `None` means "no signal", never "stay".
    pub fn translate(&mut self, raw: RawInput) -> Option<SignalEvent> {
        match raw {
            RawInput::Wheel { delta_y } => {
                let delta = if self.profile.ios {
                    delta_y * self.config.ios_wheel_multiplier
                } else {
                    delta_y
                };
                self.signal_from_delta(delta, SignalSource::Wheel)
            }
            RawInput::TouchStart { y } => {
                self.touch = Some(TouchTrack {
                    start_y: y,
                    last_y: y,
                });
                None
            }
            RawInput::TouchMove { y } => {
                if let Some(track) = self.touch.as_mut() {
                    track.last_y = y;
                }
                None
            }
            RawInput::TouchEnd { y } => {
                let track = self.touch.take()?;
                // Finger moving up reveals later content
                let delta = track.start_y - y;
                trace!(start_y = track.start_y, last_y = track.last_y, end_y = y, "Touch gesture ended");
                self.signal_from_delta(delta, SignalSource::Touch)
            }
            RawInput::Key(key) => key_direction(key).map(|direction| SignalEvent {
                direction,
                magnitude: 1.0,
                source: SignalSource::Keyboard,
            }),
        }
    }

    fn signal_from_delta(&self, delta: f64, source: SignalSource) -> Option<SignalEvent> {
        let magnitude = delta.abs();
        let tolerance = self.tolerance(source);
        if !magnitude.is_finite() || magnitude < tolerance || magnitude == 0.0 {
            trace!(?source, magnitude, tolerance, "Input below tolerance");
            return None;
        }
        Some(SignalEvent {
            direction: Direction::from_delta(delta),
            magnitude,
            source,
        })
    }
}

/// Directional meaning of a key; Home/End are absolute and have none
pub fn key_direction(key: NavKey) -> Option<Direction> {
    match key {
        NavKey::ArrowDown | NavKey::PageDown | NavKey::Space => Some(Direction::Forward),
        NavKey::ArrowUp | NavKey::PageUp | NavKey::ShiftSpace => Some(Direction::Backward),
        NavKey::Home | NavKey::End => None,
    }
}
