//! Core flight data: attitude, setpoints, command flags, motors and frames.
//!
//! All angles are integer millidegrees.

use crate::pid::AxisPids;

/// One full turn in millidegrees.
pub const FULL_TURN: i32 = 360_000;

/// Half a turn in millidegrees.
pub const HALF_TURN: i32 = 180_000;

/// Normalize a heading into `[0, FULL_TURN)`.
///
/// Works for any `i32`, not only values one turn out of range.
#[inline]
#[must_use]
pub const fn wrap_heading(value: i32) -> i32 {
    value.rem_euclid(FULL_TURN)
}

/// Shortest signed angular difference, in `[-HALF_TURN, HALF_TURN)`.
#[inline]
#[must_use]
pub fn wrap_error(value: i64) -> i64 {
    (value + i64::from(HALF_TURN)).rem_euclid(i64::from(FULL_TURN)) - i64::from(HALF_TURN)
}

/// One attitude measurement.
///
/// `yaw` is always in `[0, 360000)`; roll and pitch are signed.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttitudeSample {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

/// Commanded attitude and throttle effort.
///
/// Angles are absolute and replaced on every accepted packet. `throttle` is
/// an accumulator in `[0, 1000]` updated by deltas.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlSetpoint {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
    pub throttle: i32,
}

/// Flags raised by the command decoder.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFlags {
    /// Stop latch: while set, every motor is held at the minimum armed pulse.
    pub stop: bool,
    /// Blackbox dump requested. Cleared only once the dump has been serviced.
    pub dump_requested: bool,
}

/// All mutable control state, passed explicitly between components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightState {
    pub setpoint: ControlSetpoint,
    pub flags: CommandFlags,
    pub pids: AxisPids,
}

impl FlightState {
    /// Fresh state: zero setpoints, no flags, PIDs built from `pids`.
    #[must_use]
    pub const fn new(pids: AxisPids) -> Self {
        Self {
            setpoint: ControlSetpoint {
                roll: 0,
                pitch: 0,
                yaw: 0,
                throttle: 0,
            },
            flags: CommandFlags {
                stop: false,
                dump_requested: false,
            },
            pids,
        }
    }
}

/// Motor position in the X frame, viewed from above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motor {
    /// Front-right.
    A,
    /// Rear-right.
    B,
    /// Rear-left.
    C,
    /// Front-left.
    D,
}

impl Motor {
    /// All motors in channel order.
    pub const ALL: [Motor; 4] = [Motor::A, Motor::B, Motor::C, Motor::D];

    /// Output channel index (0..=3).
    #[inline]
    #[must_use]
    pub const fn channel(self) -> usize {
        self as usize
    }
}

/// Pulse widths for the four motors, indexed by [`Motor::channel`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorFrame {
    pub pulses: [u16; 4],
}

impl ActuatorFrame {
    /// Same pulse on every channel.
    #[must_use]
    pub const fn uniform(pulse: u16) -> Self {
        Self { pulses: [pulse; 4] }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, motor: Motor) -> u16 {
        self.pulses[motor.channel()]
    }

    #[inline]
    pub fn set(&mut self, motor: Motor, pulse: u16) {
        self.pulses[motor.channel()] = pulse;
    }

    /// Iterate `(motor, pulse)` pairs in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Motor, u16)> + '_ {
        Motor::ALL.iter().map(move |&m| (m, self.get(m)))
    }
}

/// One blackbox entry.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryRecord {
    pub pitch: i32,
    pub roll: i32,
    pub pitch_setpoint: i32,
    pub roll_setpoint: i32,
}

impl From<TelemetryRecord> for quad_proto::TelemetryLine {
    fn from(record: TelemetryRecord) -> Self {
        Self {
            pitch: record.pitch,
            pitch_setpoint: record.pitch_setpoint,
            roll: record.roll,
            roll_setpoint: record.roll_setpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_heading() {
        assert_eq!(wrap_heading(0), 0);
        assert_eq!(wrap_heading(359_999), 359_999);
        assert_eq!(wrap_heading(360_000), 0);
        assert_eq!(wrap_heading(360_100), 100);
        assert_eq!(wrap_heading(-100), 359_900);
        assert_eq!(wrap_heading(-360_000), 0);
        assert_eq!(wrap_heading(i32::MIN), i32::MIN.rem_euclid(FULL_TURN));
    }

    #[test]
    fn test_wrap_error() {
        assert_eq!(wrap_error(0), 0);
        assert_eq!(wrap_error(179_999), 179_999);
        assert_eq!(wrap_error(180_000), -180_000);
        assert_eq!(wrap_error(-180_000), -180_000);
        assert_eq!(wrap_error(350_000), -10_000);
        assert_eq!(wrap_error(-350_000), 10_000);
    }

    #[test]
    fn test_motor_channels() {
        assert_eq!(Motor::A.channel(), 0);
        assert_eq!(Motor::B.channel(), 1);
        assert_eq!(Motor::C.channel(), 2);
        assert_eq!(Motor::D.channel(), 3);
    }

    #[test]
    fn test_frame_access() {
        let mut frame = ActuatorFrame::uniform(960);
        frame.set(Motor::C, 1200);
        assert_eq!(frame.get(Motor::C), 1200);
        assert_eq!(frame.pulses, [960, 960, 1200, 960]);

        let mut it = frame.iter();
        assert_eq!(it.next(), Some((Motor::A, 960)));
        assert_eq!(it.nth(1), Some((Motor::C, 1200)));
    }

    #[test]
    fn test_record_to_line() {
        let record = TelemetryRecord {
            pitch: 1,
            roll: 2,
            pitch_setpoint: 3,
            roll_setpoint: 4,
        };
        let line: quad_proto::TelemetryLine = record.into();
        assert_eq!(line.pitch, 1);
        assert_eq!(line.pitch_setpoint, 3);
        assert_eq!(line.roll, 2);
        assert_eq!(line.roll_setpoint, 4);
    }
}
