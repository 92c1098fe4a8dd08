//! Tuning constants and runtime configuration.
//!
//! Everything is integer fixed-point. Gains are scaled by [`PID_SCALE`], so a
//! gain of `100_000` means "one pulse microsecond per millidegree".

use crate::pid::{AxisPids, PidGains};

/// Fixed-point scale shared by PID gains and the throttle gain.
pub const PID_SCALE: i64 = 100_000;

/// Divisor applied to the error before it is accumulated into the integral.
pub const INTEGRAL_DIVISOR: i64 = 1_000;

/// Stick full scale maps to this attitude setpoint (20 degrees).
pub const MAX_ATTITUDE_SETPOINT: i32 = 20_000;

/// Right stick full scale maps to this yaw step per packet (100 millidegrees).
pub const YAW_STEP_DIVISOR: i32 = 10;

/// Throttle accumulator floor. Sitting here engages the stop latch.
pub const THROTTLE_MIN: i32 = 0;

/// Throttle accumulator ceiling.
pub const THROTTLE_MAX: i32 = 1_000;

/// Error type for configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `min_armed_pulse` is not below `safe_max_pulse`.
    PulseRange,
    /// Arming pulse bounds are inverted.
    ArmingPulseRange,
    /// A motor offset lies outside the armed pulse range.
    MotorOffset,
    /// `max_integral` is negative.
    IntegralLimit,
    /// `effort_rate` or `throttle_gain` is not positive.
    ThrottleScaling,
    /// Telemetry decimation is zero.
    Decimation,
    /// Sensor retry or calibration bound is zero.
    SensorBounds,
}

/// Arming sequence parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmingConfig {
    /// Lowest pulse sent to the ESCs while arming.
    pub min_pulse: u16,
    /// Highest pulse sent to the ESCs while arming.
    pub max_pulse: u16,
    /// Pulse per unit of throttle effort (`effort * gain + bias`).
    pub effort_gain: i32,
    pub effort_bias: i32,
    /// Roll setpoint magnitude that completes arming.
    pub roll_threshold: i32,
    /// Scheduling period of one arming step.
    pub step_period_ms: u32,
}

impl ArmingConfig {
    pub const DEFAULT: Self = Self {
        min_pulse: 960,
        max_pulse: 2_000,
        effort_gain: 4,
        effort_bias: -2_000,
        roll_threshold: 10_000,
        step_period_ms: 125,
    };
}

impl Default for ArmingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Sensor bring-up parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Reset-and-identify attempts before giving up.
    pub identify_attempts: u8,
    /// Wait after reset before the chip answers.
    pub boot_delay_ms: u32,
    /// Wait after every operating mode switch.
    pub mode_switch_delay_ms: u32,
    /// Interval between calibration status polls.
    pub calibration_poll_ms: u32,
    /// Calibration polls before giving up.
    pub calibration_polls: u32,
    /// Record one telemetry sample every this many polls.
    pub telemetry_decimation: u8,
}

impl SensorConfig {
    pub const DEFAULT: Self = Self {
        identify_attempts: 10,
        boot_delay_ms: 1_000,
        mode_switch_delay_ms: 25,
        calibration_poll_ms: 50,
        calibration_polls: 1_200,
        telemetry_decimation: 3,
    };
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete flight configuration.
///
/// # Example
///
/// ```
/// use flight_core::{FlightConfig, PidGains};
///
/// let config = FlightConfig::DEFAULT
///     .with_roll_gains(PidGains::new(1_500, 10, 4_000))
///     .with_safe_max_pulse(1_400);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightConfig {
    pub roll_gains: PidGains,
    pub pitch_gains: PidGains,
    pub yaw_gains: PidGains,
    /// Anti-windup bound on every integral.
    pub max_integral: i32,
    /// Throttle effort to pulse gain, scaled by [`PID_SCALE`].
    pub throttle_gain: i32,
    /// Per-motor base pulse, indexed by channel.
    pub motor_offsets: [u16; 4],
    /// Lowest pulse while armed (motors stopped).
    pub min_armed_pulse: u16,
    /// Highest pulse while armed.
    pub safe_max_pulse: u16,
    /// Throttle effort change per full trigger deflection.
    pub effort_rate: i32,
    pub arming: ArmingConfig,
    pub sensor: SensorConfig,
}

impl FlightConfig {
    pub const DEFAULT: Self = Self {
        roll_gains: PidGains::new(1_000, 10, 5_000),
        pitch_gains: PidGains::new(1_000, 10, 5_000),
        yaw_gains: PidGains::new(500, 0, 0),
        max_integral: 100_000,
        throttle_gain: 50_000,
        motor_offsets: [960; 4],
        min_armed_pulse: 960,
        safe_max_pulse: 1_500,
        effort_rate: 10,
        arming: ArmingConfig::DEFAULT,
        sensor: SensorConfig::DEFAULT,
    };

    #[must_use]
    pub const fn with_roll_gains(mut self, gains: PidGains) -> Self {
        self.roll_gains = gains;
        self
    }

    #[must_use]
    pub const fn with_pitch_gains(mut self, gains: PidGains) -> Self {
        self.pitch_gains = gains;
        self
    }

    #[must_use]
    pub const fn with_yaw_gains(mut self, gains: PidGains) -> Self {
        self.yaw_gains = gains;
        self
    }

    #[must_use]
    pub const fn with_max_integral(mut self, max_integral: i32) -> Self {
        self.max_integral = max_integral;
        self
    }

    #[must_use]
    pub const fn with_throttle_gain(mut self, throttle_gain: i32) -> Self {
        self.throttle_gain = throttle_gain;
        self
    }

    #[must_use]
    pub const fn with_motor_offsets(mut self, offsets: [u16; 4]) -> Self {
        self.motor_offsets = offsets;
        self
    }

    #[must_use]
    pub const fn with_min_armed_pulse(mut self, pulse: u16) -> Self {
        self.min_armed_pulse = pulse;
        self
    }

    #[must_use]
    pub const fn with_safe_max_pulse(mut self, pulse: u16) -> Self {
        self.safe_max_pulse = pulse;
        self
    }

    #[must_use]
    pub const fn with_effort_rate(mut self, effort_rate: i32) -> Self {
        self.effort_rate = effort_rate;
        self
    }

    #[must_use]
    pub const fn with_arming(mut self, arming: ArmingConfig) -> Self {
        self.arming = arming;
        self
    }

    #[must_use]
    pub const fn with_sensor(mut self, sensor: SensorConfig) -> Self {
        self.sensor = sensor;
        self
    }

    /// Fresh per-axis PID state built from the configured gains.
    #[must_use]
    pub const fn axis_pids(&self) -> AxisPids {
        AxisPids::new(self.roll_gains, self.pitch_gains, self.yaw_gains)
    }

    /// Check the configuration for inconsistent bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_armed_pulse >= self.safe_max_pulse {
            return Err(ConfigError::PulseRange);
        }
        if self.arming.min_pulse > self.arming.max_pulse {
            return Err(ConfigError::ArmingPulseRange);
        }
        if self
            .motor_offsets
            .iter()
            .any(|&o| o < self.min_armed_pulse || o > self.safe_max_pulse)
        {
            return Err(ConfigError::MotorOffset);
        }
        if self.max_integral < 0 {
            return Err(ConfigError::IntegralLimit);
        }
        if self.effort_rate <= 0 || self.throttle_gain <= 0 {
            return Err(ConfigError::ThrottleScaling);
        }
        if self.sensor.telemetry_decimation == 0 {
            return Err(ConfigError::Decimation);
        }
        if self.sensor.identify_attempts == 0 || self.sensor.calibration_polls == 0 {
            return Err(ConfigError::SensorBounds);
        }
        Ok(())
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(FlightConfig::DEFAULT.validate(), Ok(()));
        assert_eq!(FlightConfig::default(), FlightConfig::DEFAULT);
    }

    #[test]
    fn test_builders() {
        let config = FlightConfig::DEFAULT
            .with_pitch_gains(PidGains::new(1, 2, 3))
            .with_max_integral(50)
            .with_effort_rate(20);
        assert_eq!(config.pitch_gains, PidGains::new(1, 2, 3));
        assert_eq!(config.roll_gains, FlightConfig::DEFAULT.roll_gains);
        assert_eq!(config.max_integral, 50);
        assert_eq!(config.effort_rate, 20);
    }

    #[test]
    fn test_validate_rejects_inverted_pulses() {
        let config = FlightConfig::DEFAULT
            .with_min_armed_pulse(1_500)
            .with_safe_max_pulse(1_000);
        assert_eq!(config.validate(), Err(ConfigError::PulseRange));
    }

    #[test]
    fn test_validate_rejects_offset_outside_range() {
        let config = FlightConfig::DEFAULT.with_motor_offsets([960, 960, 900, 960]);
        assert_eq!(config.validate(), Err(ConfigError::MotorOffset));
    }

    #[test]
    fn test_validate_rejects_zero_decimation() {
        let sensor = SensorConfig {
            telemetry_decimation: 0,
            ..SensorConfig::DEFAULT
        };
        let config = FlightConfig::DEFAULT.with_sensor(sensor);
        assert_eq!(config.validate(), Err(ConfigError::Decimation));
    }

    #[test]
    fn test_validate_rejects_bad_scaling() {
        assert_eq!(
            FlightConfig::DEFAULT.with_effort_rate(0).validate(),
            Err(ConfigError::ThrottleScaling)
        );
        assert_eq!(
            FlightConfig::DEFAULT.with_max_integral(-1).validate(),
            Err(ConfigError::IntegralLimit)
        );
    }
}
