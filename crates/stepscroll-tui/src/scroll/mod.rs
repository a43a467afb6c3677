//! Animated scrolling for the terminal front-end
//!
//! - `easing` - pure easing curves mapping progress [0, 1] to [0, 1]
//! - `timing` - progress and interpolation helpers
//! - `animation` - `AnimatedScroller`, the `ScrollController` the navigator drives
//!
//! Offsets are measured in terminal rows and kept as `f64` so that eased
//! positions do not accumulate rounding error between frames.

pub mod easing;
pub mod timing;

pub mod animation;

pub use animation::AnimatedScroller;
pub use easing::{EasingType, EasingTypeExt};
