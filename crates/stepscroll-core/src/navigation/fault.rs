//! Recoverable navigation faults
//!
//! None of these reach callers as errors. They are logged, published on the
//! navigator's event channel, and handled internally.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which guard rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Animating,
    Scrolling,
    Cooldown,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockReason::Animating => "animation in flight",
            BlockReason::Scrolling => "scroll activity",
            BlockReason::Cooldown => "cooldown",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum NavigationFault {
    #[error("Navigation to section {target} blocked: {reason}")]
    NavigationBlocked { target: usize, reason: BlockReason },

    #[error("Animation {animation_id} stuck after {elapsed_ms}ms")]
    AnimationStuck {
        animation_id: String,
        elapsed_ms: u64,
        /// The controller dropped its completion instead of timing out
        controller_gave_up: bool,
    },

    #[error("Position desync: expected section {expected}, measured section {actual}")]
    StateDesync { expected: usize, actual: usize },

    #[error("Section index {requested} outside 0..{count}, clamped to {clamped}")]
    InvalidSectionIndex {
        requested: isize,
        count: usize,
        clamped: usize,
    },
}
