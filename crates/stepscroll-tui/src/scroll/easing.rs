//! Easing curves for section transitions
//!
//! Every curve maps progress in [0, 1] to eased progress in [0, 1], with
//! `f(0) = 0` and `f(1) = 1` except `None`, which holds at 0 until the end.

pub use stepscroll_core::EasingType;

pub trait EasingTypeExt {
    /// Eased progress for `t`; input outside [0, 1] is clamped
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            EasingType::Linear => t,
            EasingType::Cubic => ease_out_pow(t, 3),
            EasingType::Quintic => ease_out_pow(t, 5),
            EasingType::EaseOut => ease_out_expo(t),
        }
    }
}

/// 1 - (1 - t)^n
#[inline]
fn ease_out_pow(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

/// 1 - 2^(-10t), pinned to 1 at the end
#[inline]
fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}
