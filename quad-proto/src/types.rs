//! Wire-level types: the joystick frame sent by the remote and the dump line
//! sent back by the aircraft.

/// Full-scale magnitude of a stick axis on the wire.
pub const STICK_FULL_SCALE: i32 = 1000;

/// Maximum value of a trigger on the wire (fully pressed).
pub const TRIGGER_MAX: i32 = 1000;

/// One joystick snapshot as carried by a command packet.
///
/// Field order matches the wire order:
/// `#<left_x>,<left_y>,<right_x>,<left_trigger>,<right_trigger>,<enter>`.
///
/// Axes are in `[-1000, 1000]`, triggers in `[0, 1000]`. The parser rejects
/// anything outside those ranges, so a parsed frame can be trusted.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickFrame {
    /// Left stick X, commands roll.
    pub left_x: i32,
    /// Left stick Y, commands pitch.
    pub left_y: i32,
    /// Right stick X, commands yaw rate.
    pub right_x: i32,
    /// Left trigger, lowers throttle.
    pub left_trigger: i32,
    /// Right trigger, raises throttle.
    pub right_trigger: i32,
    /// Enter button, requests a blackbox dump.
    pub enter: bool,
}

impl StickFrame {
    /// Sticks centered, triggers released, button up.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            left_x: 0,
            left_y: 0,
            right_x: 0,
            left_trigger: 0,
            right_trigger: 0,
            enter: false,
        }
    }

    /// Net trigger input (`right - left`), positive when asking for more throttle.
    #[inline]
    #[must_use]
    pub const fn trigger_balance(&self) -> i32 {
        self.right_trigger - self.left_trigger
    }
}

/// One blackbox record as written to the dump stream.
///
/// Serialized as `<pitch>,<pitch_setpoint>,<roll>,<roll_setpoint>\r\n`,
/// all values in millidegrees.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryLine {
    pub pitch: i32,
    pub pitch_setpoint: i32,
    pub roll: i32,
    pub roll_setpoint: i32,
}
