//! Job sequencing state machine
//!
//! The platform allows exactly one pin prompt in flight, so the sequencer
//! linearizes a bursty multi-producer request stream into a single-slot
//! protocol: one current job, one active attempt, advancing as completions
//! arrive and honoring the user's Stop/Next/Repeat overrides.
//!
//! Transition methods are synchronous and return [`Step`] actions for the
//! service loop to execute, which keeps the machine free of I/O and easy to
//! test in isolation.

use std::sync::Arc;

use shortcutd_core::prelude::*;
use shortcutd_core::{ShortcutBatch, ShortcutDescriptor};

use crate::queue::{RequestQueue, WakeSignal};

/// The one outstanding pin attempt.
///
/// The descriptor is retained (not re-popped) so a Repeat control can
/// resubmit it without consuming the next item in the batch.
#[derive(Debug)]
pub struct ActiveAttempt {
    /// The batch being drained; the sequencer owns its mutation
    pub batch: ShortcutBatch,
    /// The descriptor currently submitted to the platform
    pub descriptor: ShortcutDescriptor,
}

/// Side effects the service loop must perform after a transition
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Submit the current [`ActiveAttempt`] to the platform backend
    Submit,
    /// Forward a per-shortcut result; `None` is the empty marker for the
    /// stopped/unsupported/stale cases
    Report(Option<ShortcutDescriptor>),
}

/// How the in-flight attempt was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The platform confirmed the pin
    Confirmed,
    /// The user skipped it (Next) -- treated as success, fire-and-continue
    Skipped,
    /// The platform rejected it; advance without reporting
    Rejected,
}

/// Owns the single current job and decides which shortcut to attempt next.
pub struct JobSequencer {
    queue: Arc<RequestQueue>,
    attempt: Option<ActiveAttempt>,
}

impl JobSequencer {
    pub fn new(queue: Arc<RequestQueue>) -> Self {
        Self {
            queue,
            attempt: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.attempt.is_none()
    }

    /// The attempt the next [`Step::Submit`] refers to, if any.
    pub fn attempt(&self) -> Option<&ActiveAttempt> {
        self.attempt.as_ref()
    }

    /// React to a wake from the request queue.
    ///
    /// On [`WakeSignal::Preempt`] the stale current job is dropped without
    /// reporting its remaining descriptors; either way the next non-empty
    /// batch becomes current and its first descriptor is submitted.
    pub fn wake(&mut self, signal: WakeSignal) -> Vec<Step> {
        match signal {
            WakeSignal::None => return Vec::new(),
            WakeSignal::Preempt => {
                if let Some(stale) = self.attempt.take() {
                    warn!(
                        device = %stale.batch.device_label,
                        remaining = stale.batch.shortcuts.len() + 1,
                        "preempting stale job"
                    );
                }
            }
            WakeSignal::Wake => {
                if self.attempt.is_some() {
                    // The queue only signals Wake from idle; a wake racing
                    // an active attempt is nothing to act on.
                    debug!("wake while attempt in flight, ignoring");
                    return Vec::new();
                }
            }
        }
        self.start_next_job()
    }

    /// Resolve the in-flight attempt and move on.
    ///
    /// Confirmed and skipped attempts report their descriptor exactly once;
    /// rejected ones advance silently. When the current batch is drained the
    /// next queued batch is picked up FIFO, otherwise the sequencer goes
    /// idle. With no attempt in flight this is a no-op (the stale-callback
    /// reply is handled upstream).
    pub fn advance(&mut self, how: Advance) -> Vec<Step> {
        let Some(ActiveAttempt {
            mut batch,
            descriptor,
        }) = self.attempt.take()
        else {
            debug!(?how, "advance with no active attempt");
            return Vec::new();
        };

        self.queue.touch();
        let mut steps = match how {
            Advance::Confirmed | Advance::Skipped => vec![Step::Report(Some(descriptor))],
            Advance::Rejected => {
                info!(device = %batch.device_label, "pin attempt rejected, skipping");
                Vec::new()
            }
        };

        if let Some(next) = batch.pop_next() {
            self.attempt = Some(ActiveAttempt {
                batch,
                descriptor: next,
            });
            steps.push(Step::Submit);
        } else {
            debug!(device = %batch.device_label, "batch exhausted");
            steps.extend(self.start_next_job());
        }
        steps
    }

    /// Resubmit the exact same retained descriptor.
    pub fn repeat(&mut self) -> Vec<Step> {
        match &self.attempt {
            Some(attempt) => {
                info!(shortcut = %attempt.descriptor.display_name, "repeating attempt");
                self.queue.touch();
                vec![Step::Submit]
            }
            None => Vec::new(),
        }
    }

    /// Discard the current job and the entire pending queue.
    ///
    /// Reports the empty marker once if a job was actually stopped; a Stop
    /// while idle is a no-op.
    pub fn stop(&mut self) -> Vec<Step> {
        let had_attempt = self.attempt.take().is_some();
        self.queue.clear();
        if had_attempt {
            info!("job stopped by user");
            vec![Step::Report(None)]
        } else {
            Vec::new()
        }
    }

    /// Abort everything because the platform cannot pin shortcuts.
    ///
    /// The capability is OS-wide, so retrying queued batches is pointless;
    /// the single empty marker lets the requester surface the condition.
    pub fn abort_unsupported(&mut self) -> Vec<Step> {
        self.attempt = None;
        self.queue.clear();
        vec![Step::Report(None)]
    }

    fn start_next_job(&mut self) -> Vec<Step> {
        match self.queue.dequeue_next() {
            Some(mut batch) => {
                // dequeue_next never hands back an empty batch
                match batch.pop_next() {
                    Some(descriptor) => {
                        info!(
                            device = %batch.device_label,
                            shortcut = %descriptor.display_name,
                            queued = batch.shortcuts.len(),
                            "starting job"
                        );
                        self.attempt = Some(ActiveAttempt { batch, descriptor });
                        vec![Step::Submit]
                    }
                    None => Vec::new(),
                }
            }
            None => {
                debug!("queue exhausted, going idle");
                Vec::new()
            }
        }
    }
}
