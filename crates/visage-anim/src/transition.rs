//! One-shot value transitions keyed by channel.
//!
//! The engine owns every in-flight transition and is advanced by the driver
//! once per frame via [`TransitionEngine::tick`]. It knows nothing about
//! animation semantics; it just eases a number from `from` to `to` over a
//! duration and hands each sample to an apply callback.

use hashbrown::HashMap;
use std::cell::Cell;
use std::rc::Rc;

use crate::easing::{self, EasingFn};

/// Below this, `from` and `to` are considered equal and the transition is
/// applied synchronously.
const VALUE_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Paused,
    Finished,
}

/// Control surface for a registered transition. Cloneable; all clones observe
/// the same single-shot completion flag. Valid on the single logical thread
/// that ticks the engine.
#[derive(Clone)]
pub struct TransitionHandle {
    phase: Rc<Cell<Phase>>,
}

impl TransitionHandle {
    fn new(phase: Rc<Cell<Phase>>) -> Self {
        Self { phase }
    }

    /// Pre-resolved handle for zero-duration requests.
    fn finished() -> Self {
        Self {
            phase: Rc::new(Cell::new(Phase::Finished)),
        }
    }

    /// True once the transition completed, was cancelled, or was replaced.
    pub fn is_finished(&self) -> bool {
        self.phase.get() == Phase::Finished
    }

    /// Suspend advancement. Paused transitions neither apply values nor
    /// complete.
    pub fn pause(&self) {
        if self.phase.get() == Phase::Running {
            self.phase.set(Phase::Paused);
        }
    }

    pub fn resume(&self) {
        if self.phase.get() == Phase::Paused {
            self.phase.set(Phase::Running);
        }
    }

    /// Resolve immediately without applying further values. The entry is
    /// dropped from the engine on the next tick.
    pub fn cancel(&self) {
        self.phase.set(Phase::Finished);
    }
}

struct Transition {
    from: f32,
    to: f32,
    /// Seconds.
    duration: f32,
    elapsed: f32,
    apply: Box<dyn FnMut(f32)>,
    easing: EasingFn,
    phase: Rc<Cell<Phase>>,
}

/// Named, independent value interpolations. At most one transition per key;
/// registering a key that is already in flight resolves the old entry first
/// (last-writer-wins, never queued).
#[derive(Default)]
pub struct TransitionEngine {
    transitions: HashMap<String, Transition>,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transition with the default ease-in-out easing.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        from: f32,
        to: f32,
        duration_ms: f32,
        apply: impl FnMut(f32) + 'static,
    ) -> TransitionHandle {
        self.add_with_easing(key, from, to, duration_ms, apply, easing::DEFAULT)
    }

    /// Register a transition with a caller-supplied easing function. The
    /// easing must be monotonic [0,1] -> [0,1]; the no-overshoot guarantee
    /// holds only under that contract.
    ///
    /// A `duration_ms <= 0` or `|to - from| < epsilon` request applies `to`
    /// synchronously and returns an already-finished handle without
    /// registering anything, so zero-duration calls never leave a dangling
    /// entry.
    pub fn add_with_easing(
        &mut self,
        key: impl Into<String>,
        from: f32,
        to: f32,
        duration_ms: f32,
        mut apply: impl FnMut(f32) + 'static,
        easing: EasingFn,
    ) -> TransitionHandle {
        let key = key.into();

        // Cancel-and-replace: the previous waiter is resolved before the new
        // transition exists.
        if let Some(old) = self.transitions.remove(&key) {
            old.phase.set(Phase::Finished);
        }

        let duration = duration_ms / 1000.0;
        if !duration.is_finite() || duration <= 0.0 || (to - from).abs() < VALUE_EPSILON {
            apply(to);
            return TransitionHandle::finished();
        }

        let phase = Rc::new(Cell::new(Phase::Running));
        let handle = TransitionHandle::new(Rc::clone(&phase));
        self.transitions.insert(
            key,
            Transition {
                from,
                to,
                duration,
                elapsed: 0.0,
                apply: Box::new(apply),
                easing,
                phase,
            },
        );
        handle
    }

    /// Advance all non-paused transitions by `dt_seconds` and apply their
    /// eased values. Entries reaching full progress (and entries cancelled
    /// through their handle) are resolved and removed. Non-finite or
    /// non-positive deltas are a no-op.
    pub fn tick(&mut self, dt_seconds: f32) {
        if !dt_seconds.is_finite() {
            log::warn!("transition tick rejected: dt={dt_seconds}");
            return;
        }
        if dt_seconds <= 0.0 {
            return;
        }

        let mut completed: Vec<String> = Vec::new();
        for (key, t) in self.transitions.iter_mut() {
            match t.phase.get() {
                Phase::Paused => continue,
                Phase::Finished => {
                    completed.push(key.clone());
                    continue;
                }
                Phase::Running => {}
            }

            t.elapsed += dt_seconds;
            let progress = (t.elapsed / t.duration).min(1.0);
            let value = t.from + (t.to - t.from) * (t.easing)(progress);
            (t.apply)(value);

            if progress >= 1.0 {
                t.phase.set(Phase::Finished);
                completed.push(key.clone());
            }
        }

        for key in completed {
            self.transitions.remove(&key);
        }
    }

    /// Resolve and drop every in-flight transition. Used when the global
    /// playback rate changes, so stale timing assumptions cannot play out.
    pub fn clear(&mut self) {
        for (_, t) in self.transitions.drain() {
            t.phase.set(Phase::Finished);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.transitions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
