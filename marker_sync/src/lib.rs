//! Keeps a dashboard's bus markers in sync with events pushed by the tracker
//! server.
//!
//! The [`MarkerStore`] is populated by map initialization code, then only the
//! [`EventReceiver`] mutates it. Everything the user would see goes through a
//! [`MapView`], so the store and the receiver run without a map widget.

pub mod map_view;
pub mod marker;
pub mod marker_store;
pub mod receiver;

pub use map_view::MapView;
pub use marker::{MarkerLabel, MarkerRecord, UNKNOWN};
pub use marker_store::MarkerStore;
pub use msgs::{MarkerId, Position};
pub use receiver::{EventReceiver, Handled, LOCKED_ACKNOWLEDGMENT};
