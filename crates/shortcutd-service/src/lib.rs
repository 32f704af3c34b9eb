//! # shortcutd-service - Queuing and Pin Sequencing
//!
//! The background half of shortcutd: accepts bursts of shortcut-creation
//! requests over the local UDP control channel, serializes them into one
//! active job, drives the platform's single-slot pin API one attempt at a
//! time, and reports per-shortcut results back over the channel.
//!
//! ## Structure
//! - [`queue`] - thread-safe FIFO holding area with idle/stale detection
//! - [`sequencer`] - the job state machine (Idle / AwaitingPlatform)
//! - [`pin`] - platform backend seam and the attempt coordinator
//! - [`reporter`] - fire-and-forget result reporting
//! - [`protocol`] / [`bus`] - the line-based UDP control channel
//! - [`config`] - TOML service configuration
//! - [`service`] - lifecycle and the single-consumer event loop

pub mod bus;
pub mod config;
pub mod pin;
pub mod protocol;
pub mod queue;
pub mod reporter;
pub mod sequencer;
pub mod service;

pub use config::{default_config_path, ServiceConfig};
pub use pin::{DesktopEntryPinner, PinAttemptCoordinator, PinRequest, ShortcutPinner};
pub use queue::{RequestQueue, WakeSignal, DEFAULT_IDLE_TIMEOUT};
pub use reporter::ResultReporter;
pub use sequencer::{ActiveAttempt, Advance, JobSequencer, Step};
pub use service::{Flow, ServiceCore, ShortcutService};
