//! Driver-polled dispatch of a loaded timeline.
//!
//! The scheduler holds no clock and spawns nothing. The driver supplies a
//! monotonic `now_ms` to [`TimelineScheduler::poll`] on its own cadence and
//! can sleep until [`TimelineScheduler::next_deadline_ms`] between polls, so
//! one coalesced timer replaces one timer per event. Events fire in offset
//! order; the completion signal fires once at the timeline's total duration.

use crate::error::SpeechError;
use crate::timeline::{TimedEvent, Timeline, TimelineEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduling,
}

/// Receiver for fired events. Typically loads viseme snippets into an
/// aggregator and forwards words to caption/emotive systems.
pub trait TimelineListener {
    fn on_event(&mut self, event: &TimelineEvent, offset_ms: f64);
    /// All events fired and the total duration elapsed. Not called after
    /// [`TimelineScheduler::cancel`].
    fn on_complete(&mut self) {}
}

/// Dispatches one timeline at a time.
pub struct TimelineScheduler {
    state: SchedulerState,
    /// Sorted by offset, ascending; `cursor` marks the first unfired event.
    events: Vec<TimedEvent>,
    cursor: usize,
    started_at_ms: f64,
    done_at_ms: f64,
}

impl Default for TimelineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            events: Vec::new(),
            cursor: 0,
            started_at_ms: 0.0,
            done_at_ms: 0.0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle
    }

    /// Arm a timeline against the caller's clock. Fails while another
    /// timeline is in flight; cancel first.
    pub fn load(&mut self, timeline: Timeline, now_ms: f64) -> Result<(), SpeechError> {
        if self.state == SchedulerState::Scheduling {
            return Err(SpeechError::SchedulerBusy);
        }
        let total = timeline.total_duration_ms();
        self.events = timeline.events;
        self.events
            .sort_by(|a, b| a.offset_ms.total_cmp(&b.offset_ms));
        self.cursor = 0;
        self.started_at_ms = now_ms;
        self.done_at_ms = now_ms + total;
        self.state = SchedulerState::Scheduling;
        log::debug!(
            "timeline armed: {} events over {:.0}ms",
            self.events.len(),
            total
        );
        Ok(())
    }

    /// Drop every pending event and return to idle. No further callbacks,
    /// completion included, happen for the cancelled timeline.
    pub fn cancel(&mut self) {
        if self.state == SchedulerState::Scheduling {
            log::debug!("timeline cancelled with {} events pending", self.pending());
        }
        self.events.clear();
        self.cursor = 0;
        self.state = SchedulerState::Idle;
    }

    pub fn pending(&self) -> usize {
        self.events.len() - self.cursor
    }

    /// Fire every event due at `now_ms`, in offset order, then the completion
    /// signal once the total duration has elapsed. Returns the number of
    /// events fired. Idle polls are a no-op.
    pub fn poll(&mut self, now_ms: f64, listener: &mut dyn TimelineListener) -> usize {
        if self.state != SchedulerState::Scheduling {
            return 0;
        }

        let elapsed = now_ms - self.started_at_ms;
        let mut fired = 0;
        while let Some(e) = self.events.get(self.cursor) {
            if e.offset_ms > elapsed {
                break;
            }
            let event = e.clone();
            self.cursor += 1;
            listener.on_event(&event.event, event.offset_ms);
            fired += 1;
        }

        if self.cursor == self.events.len() && now_ms >= self.done_at_ms {
            self.events.clear();
            self.cursor = 0;
            self.state = SchedulerState::Idle;
            listener.on_complete();
        }
        fired
    }

    /// Absolute time of the next pending callback (event or completion), or
    /// `None` when idle. Drivers sleep until this between polls.
    pub fn next_deadline_ms(&self) -> Option<f64> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::Scheduling => Some(
                self.events
                    .get(self.cursor)
                    .map(|e| self.started_at_ms + e.offset_ms)
                    .unwrap_or(self.done_at_ms),
            ),
        }
    }
}
