//! Core logic for the stubble fire detection dashboard.
//!
//! The district table is loaded once, the fake scorers stand in for the
//! satellite model, and every user interaction flows through the session
//! state machine before being rendered into a serializable view.

pub mod district;
pub mod prelude;
pub mod scoring;
pub mod session;
pub mod telemetry;

pub use prelude::{Clock, FireError, FireResult, FixedClock, SystemClock};
