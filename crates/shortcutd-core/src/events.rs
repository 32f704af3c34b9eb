//! Typed events consumed by the service loop

use crate::types::ShortcutBatch;

/// User-triggered control actions, distinct from data-bearing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Discard the current job and everything queued behind it
    Stop,
    /// Treat the in-flight attempt as done without platform confirmation
    Next,
    /// Resubmit the in-flight descriptor without consuming the next one
    Repeat,
}

/// Out-of-band resolution of the in-flight pin attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    /// The platform confirmed the shortcut was pinned
    Confirmed,
    /// The platform (or the user at the prompt) rejected the attempt
    Rejected,
}

/// Everything the single-consumer service loop can react to.
///
/// Transport tasks translate raw datagrams into these; nothing downstream
/// of the parse step inspects raw payloads.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// A new shortcut batch arrived on the control channel
    Batch(ShortcutBatch),
    /// A user control action
    Control(ControlSignal),
    /// The platform resolved the in-flight pin attempt
    PinResolved(PinOutcome),
    /// Halt the event loop and tear the service down
    Quit,
}
