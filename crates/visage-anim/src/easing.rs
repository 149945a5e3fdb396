//! Easing curves for one-shot transitions.
//!
//! Every function maps [0,1] -> [0,1] monotonically with f(0)=0 and f(1)=1;
//! the transition engine relies on that to guarantee no overshoot.

pub type EasingFn = fn(f32) -> f32;

/// Default easing for channel transitions.
pub const DEFAULT: EasingFn = ease_in_out_quad;

#[inline]
pub fn linear(t: f32) -> f32 {
    t
}

#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}
