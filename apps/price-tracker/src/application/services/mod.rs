//! Tracking Services
//!
//! - `lifecycle`: start/stop tracking operations over the registry.
//! - `collector`: per-asset background price collection.

/// Per-asset polling task.
pub mod collector;

/// Start/stop tracking operations.
pub mod lifecycle;

pub use collector::{CollectorSettings, PriceCollector};
pub use lifecycle::{TrackerService, TrackingError};
