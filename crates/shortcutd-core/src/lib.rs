//! # shortcutd-core - Core Domain Types
//!
//! Foundation crate for shortcutd. Provides domain types, typed service
//! events, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`ShortcutDescriptor`] - One shortcut's name/icon/action triple
//! - [`ShortcutBatch`] - A user-approved set of shortcuts with label context
//!
//! ### Events (`events`)
//! - [`ServiceEvent`] - Everything the service loop reacts to
//! - [`ControlSignal`] - Stop/Next/Repeat user controls
//! - [`PinOutcome`] - Out-of-band resolution of a pin attempt
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with recoverability classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`

pub mod error;
pub mod events;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all shortcutd crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result};
pub use events::{ControlSignal, PinOutcome, ServiceEvent};
pub use types::{ShortcutBatch, ShortcutDescriptor, NAME_TEMPLATE_TOKEN};
