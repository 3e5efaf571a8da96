//! # Event Bus Module
//!
//! Synchronous publish/subscribe hub used by the snapshot engine to report
//! what it did: checkpoints recorded or pruned, restores started and finished,
//! catalog prefetch summaries, and toast-style notices for the user.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cabinetkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = std::sync::Arc::new(EventBus::new());
//! bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Notice]),
//!     |event| {
//!         if let AppEvent::Notice(notice) = event {
//!             show_toast(&notice.message);
//!         }
//!     },
//! );
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
