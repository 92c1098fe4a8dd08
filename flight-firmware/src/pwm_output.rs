//! Motor outputs on two RP2040 PWM slices.
//!
//! The slices run at 1 MHz (125 MHz / 125) with a 20 000 tick wrap, so the
//! compare value is the ESC pulse width in microseconds at 50 Hz.

use crate::board::PWM_TOP;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed_macro::fixed;
use flight_core::{ActuatorSink, Motor, OutputError};

/// Slice configuration with both channels at `pulse` microseconds.
#[must_use]
pub fn esc_config(pulse: u16) -> PwmConfig {
    let mut config = PwmConfig::default();
    config.divider = fixed!(125: U12F4);
    config.top = PWM_TOP;
    config.compare_a = pulse;
    config.compare_b = pulse;
    config
}

/// Four ESC outputs: slice 0 drives A/B, slice 1 drives C/D.
pub struct PwmActuators<'d> {
    front_right_rear_right: Pwm<'d>,
    rear_left_front_left: Pwm<'d>,
    config_ab: PwmConfig,
    config_cd: PwmConfig,
}

impl<'d> PwmActuators<'d> {
    /// Take two slices already created with [`esc_config`].
    pub fn new(slice_ab: Pwm<'d>, slice_cd: Pwm<'d>, initial_pulse: u16) -> Self {
        Self {
            front_right_rear_right: slice_ab,
            rear_left_front_left: slice_cd,
            config_ab: esc_config(initial_pulse),
            config_cd: esc_config(initial_pulse),
        }
    }
}

impl ActuatorSink for PwmActuators<'_> {
    fn set_pulse_width(&mut self, motor: Motor, pulse: u16) -> Result<(), OutputError> {
        if pulse > PWM_TOP {
            return Err(OutputError::OutOfRange);
        }

        let (pwm, config) = match motor {
            Motor::A | Motor::B => (&mut self.front_right_rear_right, &mut self.config_ab),
            Motor::C | Motor::D => (&mut self.rear_left_front_left, &mut self.config_cd),
        };
        match motor {
            Motor::A | Motor::C => config.compare_a = pulse,
            Motor::B | Motor::D => config.compare_b = pulse,
        }
        pwm.set_config(config);
        Ok(())
    }
}
