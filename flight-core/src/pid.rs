//! Integer PID controllers, one per axis.
//!
//! All axes share the same fixed-point policy:
//!
//! ```text
//! error      = measured - setpoint        (yaw: shortest way around)
//! integral  += error / INTEGRAL_DIVISOR   (clamped to ±max_integral)
//! derivative = error - last_error
//! output     = -(kp*error + ki*integral + kd*derivative) / PID_SCALE
//! ```
//!
//! Intermediate sums are saturating `i64` and the output saturates into
//! `i32`, so no gain and error combination overflows.

use crate::config::{INTEGRAL_DIVISOR, PID_SCALE};
use crate::types::{wrap_error, AttitudeSample, ControlSetpoint};

/// Proportional, integral and derivative gains, scaled by [`PID_SCALE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    pub kp: i32,
    pub ki: i32,
    pub kd: i32,
}

impl PidGains {
    #[must_use]
    pub const fn new(kp: i32, ki: i32, kd: i32) -> Self {
        Self { kp, ki, kd }
    }
}

/// One axis worth of controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidState {
    pub gains: PidGains,
    pub integral: i32,
    pub last_error: i32,
}

impl PidState {
    #[must_use]
    pub const fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0,
            last_error: 0,
        }
    }

    /// Run one update with a precomputed error and return the effort.
    ///
    /// A negative `max_integral` is treated as zero.
    pub fn update(&mut self, error: i64, max_integral: i32) -> i32 {
        let error = saturate(error);
        let limit = i64::from(max_integral.max(0));

        let integral = i64::from(self.integral) + i64::from(error) / INTEGRAL_DIVISOR;
        self.integral = saturate(integral.clamp(-limit, limit));

        let derivative = i64::from(error) - i64::from(self.last_error);
        self.last_error = error;

        let sum = (i64::from(self.gains.kp) * i64::from(error))
            .saturating_add(i64::from(self.gains.ki) * i64::from(self.integral))
            .saturating_add(i64::from(self.gains.kd).saturating_mul(derivative));

        saturate(sum.saturating_neg() / PID_SCALE)
    }

    /// Update for a linear axis (roll, pitch).
    pub fn update_linear(&mut self, setpoint: i32, measured: i32, max_integral: i32) -> i32 {
        self.update(i64::from(measured) - i64::from(setpoint), max_integral)
    }

    /// Update for a heading: the error takes the short way around the circle.
    pub fn update_heading(&mut self, setpoint: i32, measured: i32, max_integral: i32) -> i32 {
        self.update(
            wrap_error(i64::from(measured) - i64::from(setpoint)),
            max_integral,
        )
    }

    /// Zero the integral and the derivative history.
    pub fn reset(&mut self) {
        self.integral = 0;
        self.last_error = 0;
    }

    /// Zero the integral only.
    pub fn reset_integral(&mut self) {
        self.integral = 0;
    }
}

/// Per-axis PID efforts from one control tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisEfforts {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

/// Roll, pitch and yaw controllers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisPids {
    pub roll: PidState,
    pub pitch: PidState,
    pub yaw: PidState,
}

impl AxisPids {
    #[must_use]
    pub const fn new(roll: PidGains, pitch: PidGains, yaw: PidGains) -> Self {
        Self {
            roll: PidState::new(roll),
            pitch: PidState::new(pitch),
            yaw: PidState::new(yaw),
        }
    }

    /// Update all three axes against one measurement.
    pub fn update(
        &mut self,
        setpoint: &ControlSetpoint,
        measured: &AttitudeSample,
        max_integral: i32,
    ) -> AxisEfforts {
        AxisEfforts {
            roll: self
                .roll
                .update_linear(setpoint.roll, measured.roll, max_integral),
            pitch: self
                .pitch
                .update_linear(setpoint.pitch, measured.pitch, max_integral),
            yaw: self
                .yaw
                .update_heading(setpoint.yaw, measured.yaw, max_integral),
        }
    }

    pub fn reset(&mut self) {
        self.roll.reset();
        self.pitch.reset();
        self.yaw.reset();
    }

    pub fn reset_integral(&mut self) {
        self.roll.reset_integral();
        self.pitch.reset_integral();
        self.yaw.reset_integral();
    }
}

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_only() {
        let mut pid = PidState::new(PidGains::new(100_000, 0, 0));
        // measured above setpoint -> negative effort
        assert_eq!(pid.update_linear(0, 500, 100_000), -500);
        assert_eq!(pid.update_linear(500, 0, 100_000), 500);
    }

    #[test]
    fn test_integral_accumulates_scaled() {
        let mut pid = PidState::new(PidGains::new(0, 0, 0));
        pid.update_linear(0, 5_000, 100_000);
        assert_eq!(pid.integral, 5);
        pid.update_linear(0, 5_000, 100_000);
        assert_eq!(pid.integral, 10);
    }

    #[test]
    fn test_integral_anti_windup() {
        let mut pid = PidState::new(PidGains::new(0, 1, 0));
        for _ in 0..1_000 {
            pid.update_linear(0, 2_000_000, 100_000);
        }
        assert_eq!(pid.integral, 100_000);

        for _ in 0..1_000 {
            pid.update_linear(0, -2_000_000, 100_000);
        }
        assert_eq!(pid.integral, -100_000);
    }

    #[test]
    fn test_negative_integral_limit_pins_to_zero() {
        let mut pid = PidState::new(PidGains::new(0, 1, 0));
        pid.update_linear(0, 50_000, -5);
        assert_eq!(pid.integral, 0);
    }

    #[test]
    fn test_reset_integral_keeps_history() {
        let mut pid = PidState::new(PidGains::new(1, 1, 1));
        pid.update_linear(0, 50_000, 100_000);
        pid.reset_integral();
        assert_eq!(pid.integral, 0);
        assert_eq!(pid.last_error, 50_000);
    }

    #[test]
    fn test_derivative_uses_last_error() {
        let mut pid = PidState::new(PidGains::new(0, 0, 100_000));
        assert_eq!(pid.update_linear(0, 1_000, 100_000), -1_000);
        assert_eq!(pid.last_error, 1_000);
        // same error, no derivative
        assert_eq!(pid.update_linear(0, 1_000, 100_000), 0);
    }

    #[test]
    fn test_output_saturates() {
        let mut pid = PidState::new(PidGains::new(i32::MAX, i32::MAX, i32::MAX));
        let out = pid.update_linear(i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(out, i32::MIN);
    }

    #[test]
    fn test_heading_error_takes_short_way() {
        let mut pid = PidState::new(PidGains::new(100_000, 0, 0));
        // setpoint 1 degree, measured 359 degrees -> error is -2 degrees
        assert_eq!(pid.update_heading(1_000, 359_000, 100_000), 2_000);
        assert_eq!(pid.last_error, -2_000);
    }

    #[test]
    fn test_reset() {
        let mut pid = PidState::new(PidGains::new(1, 1, 1));
        pid.update_linear(0, 50_000, 100_000);
        assert_ne!(pid.integral, 0);
        pid.reset();
        assert_eq!(pid.integral, 0);
        assert_eq!(pid.last_error, 0);
        assert_eq!(pid.gains, PidGains::new(1, 1, 1));
    }

    #[test]
    fn test_axis_pids_update() {
        let gains = PidGains::new(100_000, 0, 0);
        let mut pids = AxisPids::new(gains, gains, gains);
        let setpoint = ControlSetpoint {
            roll: 10_000,
            pitch: 0,
            yaw: 0,
            throttle: 0,
        };
        let measured = AttitudeSample {
            roll: 0,
            pitch: 300,
            yaw: 359_900,
        };
        let efforts = pids.update(&setpoint, &measured, 100_000);
        assert_eq!(efforts.roll, 10_000);
        assert_eq!(efforts.pitch, -300);
        assert_eq!(efforts.yaw, 100);

        pids.reset();
        assert_eq!(pids.roll.last_error, 0);
    }
}
