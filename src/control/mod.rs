//! Control engine: gamepad samples in, VISCA commands out
//!
//! - [`engine`] - Pure per-tick translation ([`Controller::step`])
//! - [`state`] - Runtime-adjustable speed, deadzone and zoom state
//! - [`zoom`] - Trigger hysteresis and zoom repeat timing
//! - [`debounce`] - Cooldown for discrete controls
//! - [`runner`] - The async loop tying input, transport and display together
//!
//! Everything except [`runner`] is free of I/O and takes the clock as an
//! argument, so it can be driven tick by tick in tests.

pub mod debounce;
pub mod engine;
pub mod runner;
pub mod state;
pub mod zoom;

pub use engine::{ControlEvent, Controller, Tick};
pub use runner::{ControlLoop, LoopError};
pub use state::ControlState;
