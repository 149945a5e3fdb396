//! Stepwise fade-out of a named snippet.
//!
//! A fade is plain data: a step counter the driver decrements on its own
//! cadence. Each step lowers the snippet's intensity scale one notch
//! (0.75, 0.5, 0.25 for the default four steps) and the final step removes
//! the snippet entirely, so the channels it owned fall back to whatever else
//! is loaded.

use crate::aggregator::Aggregator;

/// Outcome of one fade step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeProgress {
    /// Intensity lowered to `scale`; call again on the next cadence tick.
    Stepped { scale: f32 },
    /// Snippet removed from the aggregator. The fade is spent.
    Removed,
}

/// Driver-paced fade-out for one snippet name. Affects every snippet sharing
/// the name, matching how name-based controls behave.
#[derive(Clone, Debug)]
pub struct Fade {
    name: String,
    total: u32,
    remaining: u32,
}

impl Fade {
    /// The conventional four-step fade.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_steps(name, 4)
    }

    pub fn with_steps(name: impl Into<String>, steps: u32) -> Self {
        let total = steps.max(1);
        Self {
            name: name.into(),
            total,
            remaining: total,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_spent(&self) -> bool {
        self.remaining == 0
    }

    /// Apply one step. Calling after [`FadeProgress::Removed`] keeps
    /// returning `Removed` without touching the aggregator again.
    pub fn step(&mut self, agg: &mut Aggregator) -> FadeProgress {
        if self.remaining == 0 {
            return FadeProgress::Removed;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            agg.remove(&self.name);
            FadeProgress::Removed
        } else {
            let scale = self.remaining as f32 / self.total as f32;
            agg.set_intensity_scale(&self.name, scale);
            FadeProgress::Stepped { scale }
        }
    }
}
