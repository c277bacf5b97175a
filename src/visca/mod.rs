//! VISCA command encoding for PTZ cameras
//!
//! Two halves over the same fixed byte layouts:
//!
//! 1. [`command`] - Intent types and the pure encoders driven by the control loop
//! 2. [`decode`] - Parser turning a packet back into the intent that produced it
//!
//! # Packet layouts
//!
//! ```text
//! Pan/tilt drive   81 01 06 01 <pan speed> <tilt speed> <pan dir> <tilt dir> FF
//! Zoom             81 01 04 07 <0x2p tele | 0x3p wide | 0x00 stop> FF
//! Focus            81 01 04 08 <02 far | 03 near | 00 stop> FF
//! One-push AF      81 01 04 18 01 FF
//! ```
//!
//! Camera firmware parses these at fixed offsets, so every encoder output is
//! byte-exact. Commands are fire-and-forget; replies are never read.

pub mod command;
pub mod decode;

pub use command::{
    encode_autofocus_trigger, encode_focus, encode_move, encode_stop, encode_zoom, AxisDrive,
    Command, Direction, FocusDirection, ViscaCommand, ZoomDirection, MAX_PAN_TILT_SPEED,
    MAX_ZOOM_SPEED,
};
pub use decode::{decode, DecodeError};
