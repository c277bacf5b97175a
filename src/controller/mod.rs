//! Gamepad input for the PTZ control loop
//!
//! - [`input`] - Per-tick [`InputSample`] snapshot and the [`InputSource`] seam
//! - [`gamepad`] - gilrs-backed source polling the first connected gamepad
//! - [`layout`] - Which sticks, triggers and buttons drive which camera function
//!
//! # Data flow
//!
//! ```text
//! Gamepad ──► InputSource::refresh ──► InputSource::sample ──► ControlLoop
//!             (hotplug, state pump)    (one snapshot per tick)
//! ```
//!
//! Stick axes are reported with right and down positive, triggers from
//! -1.0 (released) to 1.0 (fully pressed).

pub mod gamepad;
pub mod input;
pub mod layout;

pub use gamepad::GilrsInput;
pub use input::{is_wireless, AxisId, ButtonId, Hat, InputError, InputSample, InputSource};
pub use layout::ControlLayout;
