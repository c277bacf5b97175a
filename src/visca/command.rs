use std::fmt;

/// Fastest pan/tilt speed code accepted by the camera (0x01 slow .. 0x18 fast)
pub const MAX_PAN_TILT_SPEED: u8 = 0x18;

/// Fastest variable zoom speed (0x00 slow .. 0x07 fast)
pub const MAX_ZOOM_SPEED: u8 = 0x07;

const PAN_TILT_HEADER: [u8; 4] = [0x81, 0x01, 0x06, 0x01];
const ZOOM_HEADER: [u8; 4] = [0x81, 0x01, 0x04, 0x07];
const FOCUS_HEADER: [u8; 4] = [0x81, 0x01, 0x04, 0x08];
const AUTOFOCUS_TRIGGER: [u8; 6] = [0x81, 0x01, 0x04, 0x18, 0x01, 0xFF];
const TERMINATOR: u8 = 0xFF;

const ZOOM_TELE_BASE: u8 = 0x20;
const ZOOM_WIDE_BASE: u8 = 0x30;

/// Direction code of one pan/tilt axis
///
/// Pan: negative is left, positive is right. Tilt: negative is up, positive is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Negative = 0x01,
    Positive = 0x02,
    Stop = 0x03,
}

impl Direction {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Direction::Negative),
            0x02 => Some(Direction::Positive),
            0x03 => Some(Direction::Stop),
            _ => None,
        }
    }
}

/// Direction and speed for a single pan or tilt axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisDrive {
    pub direction: Direction,
    pub speed: u8,
}

impl AxisDrive {
    pub const STOP: AxisDrive = AxisDrive {
        direction: Direction::Stop,
        speed: 0x00,
    };

    /// Classifies a stick deflection against the deadzone.
    ///
    /// Inside the deadzone (inclusive) the axis stops. Outside it the
    /// deflection is normalised over the deadzone..1.0 range and cubed,
    /// which keeps small deflections slow for fine framing, then scaled
    /// into `1..=max_speed`.
    pub fn from_deflection(value: f32, deadzone: f32, max_speed: u8) -> Self {
        if value.abs() <= deadzone {
            return Self::STOP;
        }

        let direction = if value < 0.0 {
            Direction::Negative
        } else {
            Direction::Positive
        };

        let span = (1.0 - deadzone).max(f32::EPSILON);
        let norm = ((value.abs() - deadzone) / span).clamp(0.0, 1.0);
        let curve = norm * norm * norm;
        let ceiling = max_speed.clamp(1, MAX_PAN_TILT_SPEED);
        let speed = ((curve * f32::from(ceiling - 1)) as u8 + 1).clamp(1, ceiling);

        Self { direction, speed }
    }

    /// True for the stop code, whatever the speed byte
    pub fn is_stopped(&self) -> bool {
        self.direction == Direction::Stop
    }
}

/// Zoom motor direction, ordered wide < stopped < tele
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ZoomDirection {
    Wide = -1,
    #[default]
    Stopped = 0,
    Tele = 1,
}

impl ZoomDirection {
    /// Direction matching the sign of a combined trigger value
    pub fn from_sign(value: f32) -> Self {
        if value > 0.0 {
            ZoomDirection::Tele
        } else if value < 0.0 {
            ZoomDirection::Wide
        } else {
            ZoomDirection::Stopped
        }
    }

    /// Wide or tele; a moving zoom has to be refreshed
    pub fn is_moving(self) -> bool {
        self != ZoomDirection::Stopped
    }
}

/// Manual focus drive, level-triggered every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusDirection {
    Near,
    #[default]
    Stopped,
    Far,
}

impl FocusDirection {
    fn code(self) -> u8 {
        match self {
            FocusDirection::Far => 0x02,
            FocusDirection::Near => 0x03,
            FocusDirection::Stopped => 0x00,
        }
    }
}

/// Control intent for one camera, before encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViscaCommand {
    PanTilt { pan: AxisDrive, tilt: AxisDrive },
    Zoom { direction: ZoomDirection, speed: u8 },
    Focus(FocusDirection),
    AutofocusTrigger,
}

impl ViscaCommand {
    /// Short tag for logs and diagnostics
    pub fn action(&self) -> &'static str {
        match self {
            ViscaCommand::PanTilt { pan, tilt } if pan.is_stopped() && tilt.is_stopped() => {
                "stop"
            }
            ViscaCommand::PanTilt { .. } => "move",
            ViscaCommand::Zoom {
                direction: ZoomDirection::Tele,
                ..
            } => "zoom-tele",
            ViscaCommand::Zoom {
                direction: ZoomDirection::Wide,
                ..
            } => "zoom-wide",
            ViscaCommand::Zoom { .. } => "zoom-stop",
            ViscaCommand::Focus(FocusDirection::Far) => "focus-far",
            ViscaCommand::Focus(FocusDirection::Near) => "focus-near",
            ViscaCommand::Focus(FocusDirection::Stopped) => "focus-stop",
            ViscaCommand::AutofocusTrigger => "autofocus",
        }
    }

    /// Serialises the intent into its wire packet
    pub fn to_packet(&self) -> Vec<u8> {
        match *self {
            ViscaCommand::PanTilt { pan, tilt } => {
                let mut packet = PAN_TILT_HEADER.to_vec();
                packet.extend_from_slice(&[
                    pan.speed,
                    tilt.speed,
                    pan.direction.code(),
                    tilt.direction.code(),
                    TERMINATOR,
                ]);
                packet
            }
            ViscaCommand::Zoom { direction, speed } => {
                let speed = speed.min(MAX_ZOOM_SPEED);
                let code = match direction {
                    ZoomDirection::Tele => ZOOM_TELE_BASE + speed,
                    ZoomDirection::Wide => ZOOM_WIDE_BASE + speed,
                    ZoomDirection::Stopped => 0x00,
                };
                let mut packet = ZOOM_HEADER.to_vec();
                packet.extend_from_slice(&[code, TERMINATOR]);
                packet
            }
            ViscaCommand::Focus(direction) => {
                let mut packet = FOCUS_HEADER.to_vec();
                packet.extend_from_slice(&[direction.code(), TERMINATOR]);
                packet
            }
            ViscaCommand::AutofocusTrigger => AUTOFOCUS_TRIGGER.to_vec(),
        }
    }
}

/// An encoded packet together with the intent it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    intent: ViscaCommand,
    packet: Vec<u8>,
}

impl Command {
    pub fn intent(&self) -> &ViscaCommand {
        &self.intent
    }

    pub fn action(&self) -> &'static str {
        self.intent.action()
    }

    pub fn packet(&self) -> &[u8] {
        &self.packet
    }
}

impl From<ViscaCommand> for Command {
    fn from(intent: ViscaCommand) -> Self {
        let packet = intent.to_packet();
        Self { intent, packet }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.action())?;
        for (i, byte) in self.packet.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        write!(f, "]")
    }
}

/// Pan/tilt drive for a stick position.
///
/// Tilt follows the camera convention where positive is down.
pub fn encode_move(pan: f32, tilt: f32, deadzone: f32, max_speed: u8) -> Command {
    Command::from(ViscaCommand::PanTilt {
        pan: AxisDrive::from_deflection(pan, deadzone, max_speed),
        tilt: AxisDrive::from_deflection(tilt, deadzone, max_speed),
    })
}

pub fn encode_stop() -> Command {
    Command::from(ViscaCommand::PanTilt {
        pan: AxisDrive::STOP,
        tilt: AxisDrive::STOP,
    })
}

/// Variable-speed zoom. A stop carries no speed.
pub fn encode_zoom(direction: ZoomDirection, speed: u8) -> Command {
    let speed = if direction.is_moving() {
        speed.min(MAX_ZOOM_SPEED)
    } else {
        0
    };
    Command::from(ViscaCommand::Zoom { direction, speed })
}

/// Manual focus drive or stop
pub fn encode_focus(direction: FocusDirection) -> Command {
    Command::from(ViscaCommand::Focus(direction))
}

/// One-push autofocus; the camera refocuses once and returns to manual
pub fn encode_autofocus_trigger() -> Command {
    Command::from(ViscaCommand::AutofocusTrigger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_packet_is_byte_exact() {
        assert_eq!(
            encode_stop().packet(),
            &[0x81, 0x01, 0x06, 0x01, 0x00, 0x00, 0x03, 0x03, 0xFF]
        );
    }

    #[test]
    fn stop_matches_centered_move_for_any_deadzone() {
        for deadzone in [0.0, 0.15, 0.5] {
            assert_eq!(encode_move(0.0, 0.0, deadzone, 0x18), encode_stop());
        }
    }

    #[test]
    fn stop_is_idempotent() {
        assert_eq!(encode_stop().packet(), encode_stop().packet());
    }

    #[test]
    fn axis_inside_deadzone_stops() {
        for value in [-0.15, -0.1, 0.0, 0.05, 0.15] {
            let drive = AxisDrive::from_deflection(value, 0.15, 0x18);
            assert_eq!(drive, AxisDrive::STOP, "value {value}");
        }
    }

    #[test]
    fn full_deflection_reaches_max_speed() {
        let command = encode_move(1.0, -1.0, 0.15, 0x18);
        assert_eq!(
            command.packet(),
            &[0x81, 0x01, 0x06, 0x01, 0x18, 0x18, 0x02, 0x01, 0xFF]
        );
        assert_eq!(command.action(), "move");
    }

    #[test]
    fn just_outside_deadzone_never_carries_zero_speed() {
        let drive = AxisDrive::from_deflection(0.1501, 0.15, 0x18);
        assert_eq!(drive.direction, Direction::Positive);
        assert_eq!(drive.speed, 1);
    }

    #[test]
    fn speed_is_monotonic_and_bounded() {
        for max_speed in [1u8, 0x05, 0x18] {
            let mut previous = 0u8;
            for step in 1..=200 {
                let value = 0.2 + 0.8 * (step as f32 / 200.0);
                let drive = AxisDrive::from_deflection(value, 0.2, max_speed);
                assert!(drive.speed >= 1 && drive.speed <= max_speed);
                assert!(drive.speed >= previous, "speed fell at {value}");
                previous = drive.speed;
            }
        }
    }

    #[test]
    fn cubic_ramp_favours_fine_control() {
        // halfway out of the deadzone: 0.5^3 * 23 = 2.875 -> 2 + 1
        let drive = AxisDrive::from_deflection(0.575, 0.15, 0x18);
        assert_eq!(drive.speed, 3);
    }

    #[test]
    fn zoom_packets() {
        assert_eq!(
            encode_zoom(ZoomDirection::Tele, 7).packet(),
            &[0x81, 0x01, 0x04, 0x07, 0x27, 0xFF]
        );
        assert_eq!(
            encode_zoom(ZoomDirection::Wide, 0).packet(),
            &[0x81, 0x01, 0x04, 0x07, 0x30, 0xFF]
        );
        assert_eq!(
            encode_zoom(ZoomDirection::Stopped, 5).packet(),
            &[0x81, 0x01, 0x04, 0x07, 0x00, 0xFF]
        );
    }

    #[test]
    fn focus_and_autofocus_packets() {
        assert_eq!(
            encode_focus(FocusDirection::Far).packet(),
            &[0x81, 0x01, 0x04, 0x08, 0x02, 0xFF]
        );
        assert_eq!(
            encode_focus(FocusDirection::Near).packet(),
            &[0x81, 0x01, 0x04, 0x08, 0x03, 0xFF]
        );
        assert_eq!(
            encode_focus(FocusDirection::Stopped).packet(),
            &[0x81, 0x01, 0x04, 0x08, 0x00, 0xFF]
        );
        assert_eq!(
            encode_autofocus_trigger().packet(),
            &[0x81, 0x01, 0x04, 0x18, 0x01, 0xFF]
        );
    }

    #[test]
    fn display_shows_tag_and_hex() {
        assert_eq!(
            encode_focus(FocusDirection::Far).to_string(),
            "focus-far [81 01 04 08 02 FF]"
        );
    }
}
