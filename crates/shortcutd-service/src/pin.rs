//! Platform pin backend seam and the single-slot attempt coordinator

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use shortcutd_core::prelude::*;
use shortcutd_core::{PinOutcome, ServiceEvent};

use crate::sequencer::ActiveAttempt;

/// Global correlation tag counter
static CORRELATION_TAG_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique correlation tag for a pin submission
pub fn next_correlation_tag() -> u64 {
    CORRELATION_TAG_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Everything a backend needs to raise one pin prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequest {
    /// Platform shortcut id (device label + display name)
    pub shortcut_id: String,
    /// Label after template substitution
    pub label: String,
    pub icon_ref: String,
    pub action_uri: String,
    /// Tag echoed (best-effort) by the platform's completion signal
    pub correlation_tag: u64,
}

/// Platform shortcut-pinning API, consumed but not implemented by the core.
///
/// `request_pin` must return immediately; the result arrives out-of-band as
/// a `/pin/done` or `/pin/rejected` control signal (or an event the backend
/// posts itself).
pub trait ShortcutPinner: Send + Sync {
    fn is_pin_supported(&self) -> bool;
    fn request_pin(&self, request: &PinRequest) -> Result<()>;
}

/// What became of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The prompt is in flight; wait for the completion signal
    Submitted,
    /// The platform cannot pin shortcuts (or the backend failed); the
    /// whole queue must be abandoned
    CapabilityUnavailable,
}

/// Drives one platform pin request at a time.
///
/// Correlation is best-effort by design: some launchers deliver completion
/// broadcasts without a usable tag, so `resolve` trusts that the first
/// callback refers to the one in-flight attempt instead of enforcing a tag
/// match. The only hard guard is that a callback with nothing in flight is
/// treated as stale.
pub struct PinAttemptCoordinator {
    pinner: Arc<dyn ShortcutPinner>,
    in_flight: Option<u64>,
}

impl PinAttemptCoordinator {
    pub fn new(pinner: Arc<dyn ShortcutPinner>) -> Self {
        Self {
            pinner,
            in_flight: None,
        }
    }

    /// Issue exactly one platform pin request for the attempt.
    ///
    /// Backend errors are caught here and converted into
    /// [`SubmitOutcome::CapabilityUnavailable`] rather than crashing the
    /// service loop.
    pub fn submit(&mut self, attempt: &ActiveAttempt) -> SubmitOutcome {
        if !self.pinner.is_pin_supported() {
            warn!("launcher does not support pinned shortcuts");
            self.in_flight = None;
            return SubmitOutcome::CapabilityUnavailable;
        }

        let request = PinRequest {
            shortcut_id: attempt.batch.shortcut_id(&attempt.descriptor),
            label: attempt.batch.render_label(&attempt.descriptor),
            icon_ref: attempt.descriptor.icon_ref.clone(),
            action_uri: attempt.descriptor.action_link.clone(),
            correlation_tag: next_correlation_tag(),
        };

        info!(
            id = %request.shortcut_id,
            tag = request.correlation_tag,
            "sending pin request"
        );
        match self.pinner.request_pin(&request) {
            Ok(()) => {
                self.in_flight = Some(request.correlation_tag);
                SubmitOutcome::Submitted
            }
            Err(err) => {
                error!(%err, id = %request.shortcut_id, "pin request failed");
                self.in_flight = None;
                SubmitOutcome::CapabilityUnavailable
            }
        }
    }

    /// Consume the in-flight marker for an arriving completion signal.
    ///
    /// Returns the tag of the attempt the signal is taken to refer to, or
    /// `None` for a stale callback. Calling this twice for one submission
    /// yields `None` the second time, which is what makes duplicate
    /// platform callbacks harmless.
    pub fn resolve(&mut self) -> Option<u64> {
        let tag = self.in_flight.take();
        if tag.is_none() {
            debug!("completion signal with no attempt in flight");
        }
        tag
    }

    /// Forget the in-flight attempt (job stopped or sequencer went idle).
    pub fn clear(&mut self) {
        self.in_flight = None;
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

// ─────────────────────────────────────────────────────────
// Desktop-entry backend
// ─────────────────────────────────────────────────────────

/// Pin backend for freedesktop environments: writes a `.desktop` launcher
/// into the target directory and posts its own completion event, standing
/// in for a launcher pin prompt.
pub struct DesktopEntryPinner {
    dir: PathBuf,
    events: mpsc::UnboundedSender<ServiceEvent>,
}

impl DesktopEntryPinner {
    pub fn new(dir: PathBuf, events: mpsc::UnboundedSender<ServiceEvent>) -> Self {
        Self { dir, events }
    }

    fn entry_path(&self, shortcut_id: &str) -> PathBuf {
        self.dir.join(format!("{}.desktop", sanitize(shortcut_id)))
    }
}

impl ShortcutPinner for DesktopEntryPinner {
    fn is_pin_supported(&self) -> bool {
        std::fs::create_dir_all(&self.dir).is_ok()
    }

    fn request_pin(&self, request: &PinRequest) -> Result<()> {
        let path = self.entry_path(&request.shortcut_id);
        let content = format!(
            "[Desktop Entry]\nType=Application\nName={}\nIcon={}\nExec=xdg-open '{}'\n",
            request.label, request.icon_ref, request.action_uri
        );
        std::fs::write(&path, content)?;
        debug!(path = %path.display(), "wrote desktop entry");

        // Self-confirming: no prompt to wait on, so complete immediately
        if self
            .events
            .send(ServiceEvent::PinResolved(PinOutcome::Confirmed))
            .is_err()
        {
            warn!("service loop gone, dropping pin completion");
        }
        Ok(())
    }
}

/// Keep shortcut ids filesystem-safe
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
