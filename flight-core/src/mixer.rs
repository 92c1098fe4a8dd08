//! Control mixer: arming state machine, PID to motor mixing and the safety
//! clamp.
//!
//! # Mixing
//!
//! Motors in the X frame, viewed from above:
//!
//! ```text
//!   D (front-left)   A (front-right)
//!          \           /
//!           \_________/
//!           /         \
//!          /           \
//!   C (rear-left)    B (rear-right)
//! ```
//!
//! For a positive effort on each axis:
//!
//! | axis  | +           | -           |
//! |-------|-------------|-------------|
//! | pitch | A, D (front)| B, C (rear) |
//! | roll  | C, D (left) | A, B (right)|
//! | yaw   | B, D (CW)   | A, C (CCW)  |

use crate::config::{FlightConfig, PID_SCALE, THROTTLE_MIN};
use crate::pid::AxisEfforts;
use crate::types::{ActuatorFrame, AttitudeSample, FlightState, Motor};

/// Mixer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlightMode {
    /// Outputs untouched.
    Idle,
    /// Sending the ESC arming pulse, waiting for the operator.
    Arming,
    /// Closed loop control.
    Armed,
}

/// Result of one arming step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmingStep {
    /// Still arming; write this frame to the ESCs.
    Pending(ActuatorFrame),
    /// Arming finished; the mixer is now `Armed`.
    Complete,
}

/// Error type for mixer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MixerError {
    /// `tick` called outside `Armed`.
    NotArmed,
}

/// Sign of each axis effort per motor, in `Motor::ALL` order: (pitch, roll, yaw).
const MIX: [(i64, i64, i64); 4] = [
    (1, -1, -1), // A front-right
    (-1, -1, 1), // B rear-right
    (-1, 1, -1), // C rear-left
    (1, 1, 1),   // D front-left
];

pub struct ControlMixer {
    config: FlightConfig,
    mode: FlightMode,
}

impl ControlMixer {
    #[must_use]
    pub const fn new(config: FlightConfig) -> Self {
        Self {
            config,
            mode: FlightMode::Idle,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> FlightMode {
        self.mode
    }

    #[must_use]
    pub const fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// Start arming. Only leaves `Idle`; re-arming is not supported.
    pub fn begin_arming(&mut self) -> FlightMode {
        match self.mode {
            FlightMode::Idle => {
                info!("arming");
                self.mode = FlightMode::Arming;
            }
            FlightMode::Arming => {}
            FlightMode::Armed => debug!("begin_arming ignored, already armed"),
        }
        self.mode
    }

    /// Arm pulse for the current throttle effort.
    #[must_use]
    pub fn arming_pulse(&self, throttle: i32) -> u16 {
        let arming = &self.config.arming;
        let pulse = i64::from(throttle) * i64::from(arming.effort_gain) + i64::from(arming.effort_bias);
        clamp_pulse(pulse, arming.min_pulse, arming.max_pulse)
    }

    /// One arming step, scheduled every `arming.step_period_ms`.
    ///
    /// When already armed this reports `Complete`. When idle it only holds
    /// the ESCs at the lowest arming pulse.
    pub fn arming_step(&mut self, state: &mut FlightState) -> ArmingStep {
        match self.mode {
            FlightMode::Arming => {}
            FlightMode::Armed => return ArmingStep::Complete,
            FlightMode::Idle => {
                return ArmingStep::Pending(ActuatorFrame::uniform(self.config.arming.min_pulse))
            }
        }

        if state.setpoint.roll.unsigned_abs() >= self.config.arming.roll_threshold.unsigned_abs() {
            state.setpoint.throttle = THROTTLE_MIN;
            state.flags.stop = true;
            state.pids.reset();
            self.mode = FlightMode::Armed;
            info!("armed");
            return ArmingStep::Complete;
        }

        ArmingStep::Pending(ActuatorFrame::uniform(
            self.arming_pulse(state.setpoint.throttle),
        ))
    }

    /// One closed-loop control tick.
    ///
    /// # Errors
    ///
    /// Returns [`MixerError::NotArmed`] unless the mixer is `Armed`.
    pub fn tick(
        &mut self,
        state: &mut FlightState,
        measured: &AttitudeSample,
    ) -> Result<ActuatorFrame, MixerError> {
        if self.mode != FlightMode::Armed {
            return Err(MixerError::NotArmed);
        }

        let efforts = state
            .pids
            .update(&state.setpoint, measured, self.config.max_integral);

        if state.flags.stop {
            // Integral only; last_error keeps tracking the measurement.
            state.pids.reset_integral();
            return Ok(ActuatorFrame::uniform(self.config.min_armed_pulse));
        }

        trace!(
            "efforts roll={} pitch={} yaw={}",
            efforts.roll,
            efforts.pitch,
            efforts.yaw
        );

        Ok(self.mix(state.setpoint.throttle, &efforts))
    }

    /// Base throttle plus linear mixing plus clamp, without touching state.
    #[must_use]
    pub fn mix(&self, throttle: i32, efforts: &AxisEfforts) -> ActuatorFrame {
        let base = i64::from(throttle) * i64::from(self.config.throttle_gain) / PID_SCALE;
        let mut frame = ActuatorFrame::default();

        for (motor, (pitch, roll, yaw)) in Motor::ALL.iter().zip(MIX) {
            let value = base
                + i64::from(self.config.motor_offsets[motor.channel()])
                + pitch * i64::from(efforts.pitch)
                + roll * i64::from(efforts.roll)
                + yaw * i64::from(efforts.yaw);
            frame.set(
                *motor,
                clamp_pulse(value, self.config.min_armed_pulse, self.config.safe_max_pulse),
            );
        }

        frame
    }

    /// Drop back to `Idle` and clear the controllers.
    pub fn disarm(&mut self, state: &mut FlightState) {
        if self.mode != FlightMode::Idle {
            warn!("disarming");
        }
        self.mode = FlightMode::Idle;
        state.pids.reset();
    }
}

#[inline]
fn clamp_pulse(value: i64, min: u16, max: u16) -> u16 {
    if value < i64::from(min) {
        min
    } else if value > i64::from(max) {
        max
    } else {
        value as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidGains;

    fn state() -> FlightState {
        FlightState::new(FlightConfig::DEFAULT.axis_pids())
    }

    fn armed_mixer(config: FlightConfig) -> ControlMixer {
        let mut mixer = ControlMixer::new(config);
        let mut st = FlightState::new(config.axis_pids());
        mixer.begin_arming();
        st.setpoint.roll = 10_000;
        assert_eq!(mixer.arming_step(&mut st), ArmingStep::Complete);
        mixer
    }

    #[test]
    fn test_arming_transitions() {
        let mut mixer = ControlMixer::new(FlightConfig::DEFAULT);
        assert_eq!(mixer.mode(), FlightMode::Idle);
        assert_eq!(mixer.begin_arming(), FlightMode::Arming);
        assert_eq!(mixer.begin_arming(), FlightMode::Arming);

        let mut st = state();
        for _ in 0..5 {
            assert!(matches!(mixer.arming_step(&mut st), ArmingStep::Pending(_)));
            assert_eq!(mixer.mode(), FlightMode::Arming);
        }

        st.setpoint.roll = 9_999;
        assert!(matches!(mixer.arming_step(&mut st), ArmingStep::Pending(_)));

        st.setpoint.roll = -10_000;
        st.setpoint.throttle = 700;
        assert_eq!(mixer.arming_step(&mut st), ArmingStep::Complete);
        assert_eq!(mixer.mode(), FlightMode::Armed);
        assert_eq!(st.setpoint.throttle, 0);
        assert!(st.flags.stop);

        // not designed to re-arm
        assert_eq!(mixer.begin_arming(), FlightMode::Armed);
        assert_eq!(mixer.arming_step(&mut st), ArmingStep::Complete);
    }

    #[test]
    fn test_arming_frames_bounded() {
        let mut mixer = ControlMixer::new(FlightConfig::DEFAULT);
        mixer.begin_arming();
        let mut st = state();

        for throttle in [0, 100, 500, 740, 750, 900, 1_000] {
            st.setpoint.throttle = throttle;
            match mixer.arming_step(&mut st) {
                ArmingStep::Pending(frame) => {
                    for (_, pulse) in frame.iter() {
                        assert!((960..=2_000).contains(&pulse), "pulse {}", pulse);
                    }
                }
                ArmingStep::Complete => panic!("armed without roll input"),
            }
        }
    }

    #[test]
    fn test_arming_pulse_formula() {
        let mixer = ControlMixer::new(FlightConfig::DEFAULT);
        assert_eq!(mixer.arming_pulse(0), 960);
        assert_eq!(mixer.arming_pulse(700), 960);
        assert_eq!(mixer.arming_pulse(800), 1_200);
        assert_eq!(mixer.arming_pulse(1_000), 2_000);
    }

    #[test]
    fn test_tick_requires_armed() {
        let mut mixer = ControlMixer::new(FlightConfig::DEFAULT);
        let mut st = state();
        assert_eq!(
            mixer.tick(&mut st, &AttitudeSample::default()),
            Err(MixerError::NotArmed)
        );
        mixer.begin_arming();
        assert_eq!(
            mixer.tick(&mut st, &AttitudeSample::default()),
            Err(MixerError::NotArmed)
        );
    }

    #[test]
    fn test_stop_latch_forces_minimum() {
        let config = FlightConfig::DEFAULT;
        let mut mixer = armed_mixer(config);
        let mut st = state();
        st.flags.stop = true;
        st.setpoint.throttle = 1_000;
        st.pids.roll.integral = 500;

        let measured = AttitudeSample {
            roll: 15_000,
            pitch: -15_000,
            yaw: 90_000,
        };
        let frame = mixer.tick(&mut st, &measured).unwrap();
        assert_eq!(frame, ActuatorFrame::uniform(960));
        assert_eq!(st.pids.roll.integral, 0);
        assert_eq!(st.pids.roll.last_error, 15_000);
        assert_eq!(st.pids.pitch.last_error, -15_000);
    }

    #[test]
    fn test_release_after_stop_has_no_derivative_kick() {
        let config = FlightConfig::DEFAULT;
        let mut mixer = armed_mixer(config);
        let mut st = state();
        st.flags.stop = true;

        let measured = AttitudeSample {
            roll: 2_000,
            ..AttitudeSample::default()
        };
        for _ in 0..5 {
            let frame = mixer.tick(&mut st, &measured).unwrap();
            assert_eq!(frame, ActuatorFrame::uniform(960));
            assert_eq!(st.pids.roll.last_error, 2_000);
            assert_eq!(st.pids.roll.integral, 0);
        }

        st.flags.stop = false;
        st.setpoint.throttle = 400;
        let frame = mixer.tick(&mut st, &measured).unwrap();

        // kp term -20, integral 2 adds nothing after scaling, derivative 0
        assert_eq!(frame.pulses, [1_180, 1_180, 1_140, 1_140]);
    }

    #[test]
    fn test_level_hover_is_uniform() {
        let mut mixer = armed_mixer(FlightConfig::DEFAULT);
        let mut st = state();
        st.setpoint.throttle = 500;

        let frame = mixer.tick(&mut st, &AttitudeSample::default()).unwrap();
        // 500 * 50000 / 100000 + 960
        assert_eq!(frame, ActuatorFrame::uniform(1_210));
    }

    #[test]
    fn test_mix_signs() {
        let mixer = ControlMixer::new(FlightConfig::DEFAULT);
        let base = 1_210;

        let pitch = mixer.mix(500, &AxisEfforts { pitch: 50, ..AxisEfforts::default() });
        assert_eq!(pitch.pulses, [base + 50, base - 50, base - 50, base + 50]);

        let roll = mixer.mix(500, &AxisEfforts { roll: 50, ..AxisEfforts::default() });
        assert_eq!(roll.pulses, [base - 50, base - 50, base + 50, base + 50]);

        let yaw = mixer.mix(500, &AxisEfforts { yaw: 50, ..AxisEfforts::default() });
        assert_eq!(yaw.pulses, [base - 50, base + 50, base - 50, base + 50]);
    }

    #[test]
    fn test_mix_clamps() {
        let mixer = ControlMixer::new(FlightConfig::DEFAULT);
        let frame = mixer.mix(
            1_000,
            &AxisEfforts {
                pitch: 10_000,
                ..AxisEfforts::default()
            },
        );
        assert_eq!(frame.pulses, [1_500, 960, 960, 1_500]);

        let frame = mixer.mix(0, &AxisEfforts { roll: i32::MIN, pitch: i32::MIN, yaw: i32::MIN });
        for (_, pulse) in frame.iter() {
            assert!((960..=1_500).contains(&pulse));
        }
    }

    #[test]
    fn test_positive_roll_effort_raises_left() {
        // measured roll below the setpoint gives positive roll effort
        let config = FlightConfig::DEFAULT
            .with_roll_gains(PidGains::new(1_000, 0, 0))
            .with_pitch_gains(PidGains::new(0, 0, 0))
            .with_yaw_gains(PidGains::new(0, 0, 0));
        let mut mixer = armed_mixer(config);
        let mut st = FlightState::new(config.axis_pids());
        st.setpoint.roll = 10_000;
        st.setpoint.throttle = 400;

        let frame = mixer.tick(&mut st, &AttitudeSample::default()).unwrap();
        // 400 * 50000 / 100000 + 960
        let base: u16 = 1_160;
        assert_eq!(frame.get(Motor::C), base + 100);
        assert_eq!(frame.get(Motor::D), base + 100);
        assert_eq!(frame.get(Motor::A), base - 100);
        assert_eq!(frame.get(Motor::B), base - 100);
    }

    #[test]
    fn test_disarm() {
        let mut mixer = armed_mixer(FlightConfig::DEFAULT);
        let mut st = state();
        st.pids.pitch.integral = 42;
        mixer.disarm(&mut st);
        assert_eq!(mixer.mode(), FlightMode::Idle);
        assert_eq!(st.pids.pitch.integral, 0);
        assert_eq!(
            mixer.tick(&mut st, &AttitudeSample::default()),
            Err(MixerError::NotArmed)
        );
    }
}
