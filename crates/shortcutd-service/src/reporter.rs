//! Per-shortcut result reporting
//!
//! Reports are fire-and-forget: the reporter serializes the result and
//! hands it to the outbound channel, whose sender task does the actual UDP
//! send. A full or closed channel is logged, never propagated -- transport
//! trouble must not disturb the sequencer's state.

use tokio::sync::mpsc;

use shortcutd_core::prelude::*;
use shortcutd_core::ShortcutDescriptor;

use crate::protocol;

/// Formats completion signals and forwards them to the outbound transport.
pub struct ResultReporter {
    outbound: mpsc::UnboundedSender<String>,
}

impl ResultReporter {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { outbound }
    }

    /// Report one completed descriptor, or the empty marker for the
    /// stopped/unsupported/stale cases.
    pub fn report(&self, descriptor: Option<&ShortcutDescriptor>) {
        let line = protocol::encode_result(descriptor);
        match descriptor {
            Some(d) => debug!(shortcut = %d.display_name, "reporting result"),
            None => debug!("reporting empty marker"),
        }
        if self.outbound.send(line).is_err() {
            warn!("result channel closed, dropping report");
        }
    }
}
