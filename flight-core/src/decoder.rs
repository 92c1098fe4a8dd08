//! Command decoder: turns remote packets into setpoints and flags.

use crate::config::{
    MAX_ATTITUDE_SETPOINT, THROTTLE_MAX, THROTTLE_MIN, YAW_STEP_DIVISOR,
};
use crate::types::{wrap_heading, CommandFlags, ControlSetpoint};
use quad_proto::{parse_packet, ParseError, StickFrame, STICK_FULL_SCALE, TRIGGER_MAX};

/// Error type for packet decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The packet failed to parse or validate. State was not touched.
    MalformedPacket(ParseError),
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        DecodeError::MalformedPacket(err)
    }
}

/// What an accepted packet did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeOutcome {
    /// The throttle update hit a bound and was clamped.
    pub throttle_clamped: bool,
    /// The stop latch is engaged after this packet.
    pub stop_engaged: bool,
    /// The packet asked for a blackbox dump.
    pub dump_requested: bool,
}

/// Stateless mapping from packets to setpoints, plus acceptance counters.
#[derive(Debug, Clone)]
pub struct CommandDecoder {
    effort_rate: i32,
    accepted: u32,
    rejected: u32,
}

impl CommandDecoder {
    /// Create a decoder. `effort_rate` is the throttle change for one full
    /// trigger deflection.
    #[must_use]
    pub const fn new(effort_rate: i32) -> Self {
        Self {
            effort_rate,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Decode one packet and apply it.
    ///
    /// On error nothing in `setpoint` or `flags` changes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPacket`] for anything that is not a
    /// well-formed, in-range six-field packet.
    pub fn decode(
        &mut self,
        packet: &[u8],
        current_yaw: i32,
        setpoint: &mut ControlSetpoint,
        flags: &mut CommandFlags,
    ) -> Result<DecodeOutcome, DecodeError> {
        match parse_packet(packet) {
            Ok(frame) => {
                self.accepted = self.accepted.wrapping_add(1);
                Ok(self.apply(&frame, current_yaw, setpoint, flags))
            }
            Err(e) => {
                self.rejected = self.rejected.wrapping_add(1);
                warn!("rejected packet: {:?}", e);
                Err(e.into())
            }
        }
    }

    /// Apply an already-parsed frame.
    pub fn apply(
        &self,
        frame: &StickFrame,
        current_yaw: i32,
        setpoint: &mut ControlSetpoint,
        flags: &mut CommandFlags,
    ) -> DecodeOutcome {
        setpoint.roll = frame.left_x * MAX_ATTITUDE_SETPOINT / STICK_FULL_SCALE;
        setpoint.pitch = frame.left_y * MAX_ATTITUDE_SETPOINT / STICK_FULL_SCALE;
        setpoint.yaw = wrap_heading(current_yaw.saturating_add(frame.right_x / YAW_STEP_DIVISOR));

        let raw = setpoint
            .throttle
            .saturating_add(frame.trigger_balance().saturating_mul(self.effort_rate) / TRIGGER_MAX);
        let throttle = raw.clamp(THROTTLE_MIN, THROTTLE_MAX);
        setpoint.throttle = throttle;

        // Throttle at the floor latches stop; anything above it releases.
        flags.stop = throttle == THROTTLE_MIN;

        if frame.enter {
            flags.dump_requested = true;
        }

        trace!(
            "setpoint roll={} pitch={} yaw={} throttle={}",
            setpoint.roll,
            setpoint.pitch,
            setpoint.yaw,
            setpoint.throttle
        );

        DecodeOutcome {
            throttle_clamped: raw != throttle,
            stop_engaged: flags.stop,
            dump_requested: frame.enter,
        }
    }

    /// Packets accepted so far (wrapping).
    #[must_use]
    pub const fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Packets rejected so far (wrapping).
    #[must_use]
    pub const fn rejected(&self) -> u32 {
        self.rejected
    }
}
