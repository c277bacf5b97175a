//! Camera targets and command delivery
//!
//! - [`target`] - Addressing of the remote cameras and parsing of target lists
//! - [`transport`] - Best-effort delivery of encoded commands over TCP or UDP
//!
//! The target list is built once at startup and never mutated afterwards.

pub mod target;
pub mod transport;

pub use target::{parse_target, parse_target_list, CameraTarget, CameraTargets, TargetError, Transport};
pub use transport::{CommandTransport, NetworkTransport, SendFuture, TransportError};
