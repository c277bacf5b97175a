//! Packet decoder
//!
//! Accepts exactly the four layouts the encoders emit and maps each back to
//! its [`ViscaCommand`]. Used to check encoder output and to log packets
//! in readable form.

use super::command::{AxisDrive, Direction, FocusDirection, ViscaCommand, ZoomDirection};
use super::command::{MAX_PAN_TILT_SPEED, MAX_ZOOM_SPEED};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Packet too short: {0} bytes")]
    Truncated(usize),

    #[error("Packet is not a camera command: header {0:02X?}")]
    BadHeader(Vec<u8>),

    #[error("Packet is missing the 0xFF terminator")]
    MissingTerminator,

    #[error("Unknown command category {0:02X} {1:02X}")]
    UnknownCommand(u8, u8),

    #[error("Invalid {field} byte: {value:02X}")]
    InvalidField { field: &'static str, value: u8 },
}

/// Parses a packet produced by the encoders back into its intent.
pub fn decode(packet: &[u8]) -> Result<ViscaCommand, DecodeError> {
    if packet.len() < 6 {
        return Err(DecodeError::Truncated(packet.len()));
    }
    if packet[0] != 0x81 || packet[1] != 0x01 {
        return Err(DecodeError::BadHeader(packet[..2].to_vec()));
    }
    if packet.last() != Some(&0xFF) {
        return Err(DecodeError::MissingTerminator);
    }

    match (packet[2], packet[3]) {
        (0x06, 0x01) => decode_pan_tilt(packet),
        (0x04, 0x07) => expect_len(packet, 6).and_then(|_| decode_zoom(packet[4])),
        (0x04, 0x08) => expect_len(packet, 6).and_then(|_| decode_focus(packet[4])),
        (0x04, 0x18) => {
            expect_len(packet, 6)?;
            match packet[4] {
                0x01 => Ok(ViscaCommand::AutofocusTrigger),
                value => Err(DecodeError::InvalidField {
                    field: "autofocus",
                    value,
                }),
            }
        }
        (category, command) => Err(DecodeError::UnknownCommand(category, command)),
    }
}

fn expect_len(packet: &[u8], len: usize) -> Result<(), DecodeError> {
    if packet.len() == len {
        Ok(())
    } else {
        Err(DecodeError::MissingTerminator)
    }
}

fn decode_pan_tilt(packet: &[u8]) -> Result<ViscaCommand, DecodeError> {
    if packet.len() < 9 {
        return Err(DecodeError::Truncated(packet.len()));
    }
    expect_len(packet, 9)?;

    let pan = axis_drive(packet[4], packet[6], "pan")?;
    let tilt = axis_drive(packet[5], packet[7], "tilt")?;
    Ok(ViscaCommand::PanTilt { pan, tilt })
}

fn axis_drive(speed: u8, code: u8, field: &'static str) -> Result<AxisDrive, DecodeError> {
    let direction = Direction::from_code(code).ok_or(DecodeError::InvalidField {
        field,
        value: code,
    })?;
    if speed > MAX_PAN_TILT_SPEED {
        return Err(DecodeError::InvalidField {
            field: "speed",
            value: speed,
        });
    }
    Ok(AxisDrive { direction, speed })
}

fn decode_zoom(code: u8) -> Result<ViscaCommand, DecodeError> {
    let (direction, speed) = match code {
        0x00 => (ZoomDirection::Stopped, 0),
        0x20..=0x2F if code - 0x20 <= MAX_ZOOM_SPEED => (ZoomDirection::Tele, code - 0x20),
        0x30..=0x3F if code - 0x30 <= MAX_ZOOM_SPEED => (ZoomDirection::Wide, code - 0x30),
        value => {
            return Err(DecodeError::InvalidField {
                field: "zoom",
                value,
            })
        }
    };
    Ok(ViscaCommand::Zoom { direction, speed })
}

fn decode_focus(code: u8) -> Result<ViscaCommand, DecodeError> {
    let direction = match code {
        0x00 => FocusDirection::Stopped,
        0x02 => FocusDirection::Far,
        0x03 => FocusDirection::Near,
        value => {
            return Err(DecodeError::InvalidField {
                field: "focus",
                value,
            })
        }
    };
    Ok(ViscaCommand::Focus(direction))
}
