//! Headless testing helpers: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive a [`Runtime`](crate::runtime::Runtime) over the
//! in-memory DOM: dispatch events, settle the scheduler, and read markup back.
//! Use [`render_to_string`] and related helpers to capture output as plain
//! text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{mutations_to_string, render_element_to_string, render_to_string};
