//! Cooperative virtual-time event loop standing in for the page's
//! animation-frame and interval callbacks.
use std::collections::BTreeMap;

use agent_logging::agent_trace;
use chrono::Utc;
use mscroller_core::{FrameId, TimerId};

/// Spacing between animation frames (60 Hz).
pub const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Callback {
    Frame { frame: FrameId, timestamp_ms: f64 },
    Interval { timer: TimerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Frame(FrameId),
    Interval(TimerId),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_ms: f64,
    /// Registration order; breaks ties between callbacks due together.
    seq: u64,
    period_ms: Option<f64>,
}

/// Holds pending callbacks and a clock that only moves when a callback is
/// delivered. Cancelling removes the callback outright, so a cancelled
/// frame or interval can never fire late.
#[derive(Debug)]
pub struct Scheduler {
    now_ms: f64,
    epoch_start_ms: i64,
    next_seq: u64,
    frames_delivered: u64,
    pending: BTreeMap<Slot, Scheduled>,
}

impl Scheduler {
    /// Clock anchored at the current wall time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now().timestamp_millis())
    }

    /// Clock anchored at `epoch_start_ms` milliseconds since the Unix epoch.
    pub fn starting_at(epoch_start_ms: i64) -> Self {
        Self {
            now_ms: 0.0,
            epoch_start_ms,
            next_seq: 0,
            frames_delivered: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Milliseconds since the page loaded.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Wall-clock milliseconds since the Unix epoch.
    pub fn epoch_ms(&self) -> i64 {
        self.epoch_start_ms + self.now_ms as i64
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    pub fn request_frame(&mut self, frame: FrameId) {
        let due_ms = self.now_ms + FRAME_INTERVAL_MS;
        self.schedule(Slot::Frame(frame), due_ms, None);
    }

    /// Returns whether the frame was still pending.
    pub fn cancel_frame(&mut self, frame: FrameId) -> bool {
        self.pending.remove(&Slot::Frame(frame)).is_some()
    }

    pub fn start_interval(&mut self, timer: TimerId, period_ms: u64) {
        let period_ms = period_ms.max(1) as f64;
        self.schedule(Slot::Interval(timer), self.now_ms + period_ms, Some(period_ms));
    }

    /// Returns whether the interval was still running.
    pub fn cancel_interval(&mut self, timer: TimerId) -> bool {
        self.pending.remove(&Slot::Interval(timer)).is_some()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.keys().any(|slot| matches!(slot, Slot::Frame(_)))
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Delivers the earliest callback due at or before `limit_ms`, moving
    /// the clock to its due time. Without one, the clock moves to
    /// `limit_ms` and `None` is returned.
    pub fn next_until(&mut self, limit_ms: f64) -> Option<Callback> {
        let Some((slot, scheduled)) = self.earliest().filter(|(_, s)| s.due_ms <= limit_ms) else {
            self.now_ms = self.now_ms.max(limit_ms);
            return None;
        };
        self.now_ms = self.now_ms.max(scheduled.due_ms);

        match slot {
            Slot::Frame(frame) => {
                self.pending.remove(&slot);
                self.frames_delivered += 1;
                agent_logging::set_frame(self.frames_delivered);
                agent_trace!("frame {} at {:.1}ms", frame, self.now_ms);
                Some(Callback::Frame {
                    frame,
                    timestamp_ms: self.now_ms,
                })
            }
            Slot::Interval(timer) => {
                if let Some(period_ms) = scheduled.period_ms {
                    self.schedule(slot, scheduled.due_ms + period_ms, Some(period_ms));
                }
                Some(Callback::Interval { timer })
            }
        }
    }

    fn earliest(&self) -> Option<(Slot, Scheduled)> {
        self.pending
            .iter()
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(slot, scheduled)| (*slot, *scheduled))
    }

    fn schedule(&mut self, slot: Slot, due_ms: f64, period_ms: Option<f64>) {
        self.next_seq += 1;
        self.pending.insert(
            slot,
            Scheduled {
                due_ms,
                seq: self.next_seq,
                period_ms,
            },
        );
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
