//! Service lifecycle and the single-consumer event loop
//!
//! [`ServiceCore`] holds the queue, sequencer, coordinator, and reporter
//! and applies one event at a time; [`ShortcutService`] wires it to the
//! UDP control channel and owns startup/teardown. All state-machine
//! transitions run on the loop task; only the queue itself is shared with
//! the transport task.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use shortcutd_core::prelude::*;
use shortcutd_core::{ControlSignal, PinOutcome, ServiceEvent};

use crate::bus::{spawn_result_sender, ControlBus};
use crate::config::ServiceConfig;
use crate::pin::{DesktopEntryPinner, PinAttemptCoordinator, ShortcutPinner, SubmitOutcome};
use crate::queue::{RequestQueue, WakeSignal};
use crate::reporter::ResultReporter;
use crate::sequencer::{Advance, JobSequencer, Step};

/// Whether the event loop should keep running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// The request-queuing and sequencing engine, free of any transport.
pub struct ServiceCore {
    queue: Arc<RequestQueue>,
    sequencer: JobSequencer,
    coordinator: PinAttemptCoordinator,
    reporter: ResultReporter,
}

impl ServiceCore {
    pub fn new(
        idle_timeout: Duration,
        pinner: Arc<dyn ShortcutPinner>,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Self {
        let queue = Arc::new(RequestQueue::new(idle_timeout));
        Self {
            sequencer: JobSequencer::new(Arc::clone(&queue)),
            coordinator: PinAttemptCoordinator::new(pinner),
            reporter: ResultReporter::new(outbound),
            queue,
        }
    }

    /// Apply one event. Everything the engine does happens in here, one
    /// event at a time.
    #[must_use]
    pub fn handle_event(&mut self, event: ServiceEvent) -> Flow {
        match event {
            ServiceEvent::Batch(batch) => {
                debug!(
                    device = %batch.device_label,
                    shortcuts = batch.shortcuts.len(),
                    "batch received"
                );
                let signal = self.queue.enqueue(batch);
                if signal != WakeSignal::None {
                    let steps = self.sequencer.wake(signal);
                    self.run_steps(steps);
                }
            }
            ServiceEvent::Control(ControlSignal::Stop) => {
                self.coordinator.clear();
                let steps = self.sequencer.stop();
                self.run_steps(steps);
            }
            ServiceEvent::Control(ControlSignal::Next) => {
                let steps = self.sequencer.advance(Advance::Skipped);
                self.run_steps(steps);
            }
            ServiceEvent::Control(ControlSignal::Repeat) => {
                let steps = self.sequencer.repeat();
                self.run_steps(steps);
            }
            ServiceEvent::PinResolved(outcome) => match self.coordinator.resolve() {
                Some(tag) => {
                    trace!(tag, ?outcome, "pin attempt resolved");
                    let how = match outcome {
                        PinOutcome::Confirmed => Advance::Confirmed,
                        PinOutcome::Rejected => Advance::Rejected,
                    };
                    let steps = self.sequencer.advance(how);
                    self.run_steps(steps);
                }
                None => {
                    // Stale callback: no state transition, but confirmed
                    // signals still get the empty-marker reply the
                    // requester is waiting on.
                    if outcome == PinOutcome::Confirmed {
                        self.reporter.report(None);
                    }
                }
            },
            ServiceEvent::Quit => {
                info!("quit requested");
                return Flow::Shutdown;
            }
        }

        // A dangling in-flight marker after the sequencer went idle would
        // misroute the next completion signal.
        if self.sequencer.is_idle() {
            self.coordinator.clear();
        }
        Flow::Continue
    }

    /// Execute sequencer steps, feeding capability aborts back in.
    fn run_steps(&mut self, steps: Vec<Step>) {
        let mut pending: VecDeque<Step> = steps.into();
        while let Some(step) = pending.pop_front() {
            match step {
                Step::Report(descriptor) => self.reporter.report(descriptor.as_ref()),
                Step::Submit => {
                    let Some(attempt) = self.sequencer.attempt() else {
                        warn!("submit step with no active attempt");
                        continue;
                    };
                    if self.coordinator.submit(attempt) == SubmitOutcome::CapabilityUnavailable {
                        pending.extend(self.sequencer.abort_unsupported());
                    }
                }
            }
        }
    }
}

/// Owns process-wide startup and shutdown around the event loop.
pub struct ShortcutService {
    config: ServiceConfig,
}

impl ShortcutService {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Bind the control channel and run until a quit signal arrives.
    pub async fn run(self) -> Result<()> {
        let bus = ControlBus::bind(self.config.bind_port).await?;
        let bind_port = bus.local_port()?;
        info!(
            bind_port,
            reply_port = self.config.reply_port,
            "control channel ready"
        );

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let listener = bus.spawn_listener(event_tx.clone());
        let sender = spawn_result_sender(self.config.reply_port, result_rx);

        let pinner: Arc<dyn ShortcutPinner> = Arc::new(DesktopEntryPinner::new(
            self.config.pin_directory(),
            event_tx,
        ));
        let mut core = ServiceCore::new(self.config.idle_timeout(), pinner, result_tx);

        while let Some(event) = event_rx.recv().await {
            if core.handle_event(event) == Flow::Shutdown {
                break;
            }
        }

        listener.abort();
        sender.abort();
        info!("service stopped");
        Ok(())
    }
}
