//! Thread-safe FIFO holding area for incoming shortcut batches
//!
//! The queue is the only state shared between the transport task (which
//! enqueues) and the sequencer task (which drains). The lock is held for
//! collection manipulation only, never across a pin submission.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use shortcutd_core::prelude::*;
use shortcutd_core::ShortcutBatch;

/// Inactivity window after which a stale current job may be preempted
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// What the enqueuing side should do after appending a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSignal {
    /// A job is already being worked; the batch just waits its turn
    None,
    /// The sequencer was idle and must be woken to start draining
    Wake,
    /// The current job went stale; wake and discard it first
    Preempt,
}

#[derive(Debug)]
struct Inner {
    pending: VecDeque<ShortcutBatch>,
    job_active: bool,
    last_activity: Instant,
}

/// Ordered holding area for batches awaiting processing.
///
/// At most one logical wake is ever produced per idle period: enqueuing
/// while a job is active returns [`WakeSignal::None`].
#[derive(Debug)]
pub struct RequestQueue {
    idle_timeout: Duration,
    inner: Mutex<Inner>,
}

impl RequestQueue {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                job_active: false,
                last_activity: Instant::now(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // All mutations are small pointer/collection updates; a poisoned
        // lock cannot leave the queue in a torn state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a batch and tell the caller whether the sequencer needs a wake.
    ///
    /// A current job counts as active until it has seen no activity for the
    /// idle timeout; past that it is treated as abandoned and the caller
    /// gets [`WakeSignal::Preempt`].
    pub fn enqueue(&self, batch: ShortcutBatch) -> WakeSignal {
        let mut inner = self.lock();
        let was_idle = inner.pending.is_empty() && !inner.job_active;
        let stale = !was_idle && inner.last_activity.elapsed() > self.idle_timeout;
        inner.pending.push_back(batch);

        if was_idle {
            WakeSignal::Wake
        } else if stale {
            inner.last_activity = Instant::now();
            WakeSignal::Preempt
        } else {
            WakeSignal::None
        }
    }

    /// Take the next batch that actually has shortcuts in it.
    ///
    /// Batches are drained oldest-first; empty ones are discarded along the
    /// way. Returns `None` when the queue is exhausted, which also marks
    /// the sequencer idle for future enqueues.
    pub fn dequeue_next(&self) -> Option<ShortcutBatch> {
        let mut inner = self.lock();
        while let Some(batch) = inner.pending.pop_front() {
            if !batch.is_empty() {
                inner.job_active = true;
                inner.last_activity = Instant::now();
                return Some(batch);
            }
            debug!(device = %batch.device_label, "discarding empty batch");
        }
        inner.job_active = false;
        None
    }

    /// Record activity on the current job, resetting the staleness clock.
    pub fn touch(&self) {
        self.lock().last_activity = Instant::now();
    }

    /// Mark the sequencer idle without touching pending batches.
    pub fn mark_idle(&self) {
        self.lock().job_active = false;
    }

    /// Drop everything: pending batches and the active-job marker.
    pub fn clear(&self) {
        let mut inner = self.lock();
        let dropped = inner.pending.len();
        inner.pending.clear();
        inner.job_active = false;
        if dropped > 0 {
            info!(dropped, "cleared pending batches");
        }
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(device: &str, names: &[&str]) -> ShortcutBatch {
        ShortcutBatch {
            device_label: device.to_string(),
            name_template: "$sh$".to_string(),
            shortcuts: names
                .iter()
                .map(|n| shortcutd_core::ShortcutDescriptor {
                    display_name: n.to_string(),
                    icon_ref: String::new(),
                    action_link: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_enqueue_while_idle_wakes() {
        let queue = RequestQueue::default();
        assert_eq!(queue.enqueue(batch("a", &["x"])), WakeSignal::Wake);
    }

    #[test]
    fn test_enqueue_while_active_does_not_wake() {
        let queue = RequestQueue::default();
        queue.enqueue(batch("a", &["x"]));
        queue.dequeue_next().unwrap();
        assert_eq!(queue.enqueue(batch("b", &["y"])), WakeSignal::None);
    }

    #[test]
    fn test_single_wake_per_idle_period() {
        let queue = RequestQueue::default();
        assert_eq!(queue.enqueue(batch("a", &["x"])), WakeSignal::Wake);
        // Still idle from the queue's perspective (nothing dequeued), but
        // the first wake is already in flight.
        assert_eq!(queue.enqueue(batch("b", &["y"])), WakeSignal::None);
    }

    #[test]
    fn test_dequeue_is_fifo_and_skips_empty() {
        let queue = RequestQueue::default();
        queue.enqueue(batch("first", &["x"]));
        queue.enqueue(batch("empty", &[]));
        queue.enqueue(batch("second", &["y"]));

        assert_eq!(queue.dequeue_next().unwrap().device_label, "first");
        assert_eq!(queue.dequeue_next().unwrap().device_label, "second");
        assert!(queue.dequeue_next().is_none());
    }

    #[test]
    fn test_dequeue_exhaustion_marks_idle() {
        let queue = RequestQueue::default();
        queue.enqueue(batch("a", &["x"]));
        queue.dequeue_next().unwrap();
        assert!(queue.dequeue_next().is_none());
        // Idle again: the next enqueue must wake
        assert_eq!(queue.enqueue(batch("b", &["y"])), WakeSignal::Wake);
    }

    #[test]
    fn test_stale_job_preempts() {
        let queue = RequestQueue::new(Duration::from_millis(20));
        queue.enqueue(batch("a", &["x"]));
        queue.dequeue_next().unwrap();
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(queue.enqueue(batch("b", &["y"])), WakeSignal::Preempt);
        // The preempting enqueue reset the clock, so a follow-up is routine
        assert_eq!(queue.enqueue(batch("c", &["z"])), WakeSignal::None);
    }

    #[test]
    fn test_touch_defers_staleness() {
        let queue = RequestQueue::new(Duration::from_millis(40));
        queue.enqueue(batch("a", &["x"]));
        queue.dequeue_next().unwrap();
        std::thread::sleep(Duration::from_millis(25));
        queue.touch();
        std::thread::sleep(Duration::from_millis(25));
        // 50ms since dequeue but only 25ms since the last activity
        assert_eq!(queue.enqueue(batch("b", &["y"])), WakeSignal::None);
    }

    #[test]
    fn test_clear_drops_pending_and_active() {
        let queue = RequestQueue::default();
        queue.enqueue(batch("a", &["x"]));
        queue.dequeue_next().unwrap();
        queue.enqueue(batch("b", &["y"]));
        queue.clear();
        assert_eq!(queue.pending_len(), 0);
        assert!(queue.dequeue_next().is_none());
        assert_eq!(queue.enqueue(batch("c", &["z"])), WakeSignal::Wake);
    }
}
