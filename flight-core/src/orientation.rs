//! Orientation provider: sensor bring-up and attitude polling.

use crate::config::SensorConfig;
use crate::telemetry::TelemetryRecorder;
use crate::types::{wrap_heading, AttitudeSample, ControlSetpoint, TelemetryRecord};
use embedded_hal::delay::DelayNs;

/// Value of the chip id register on a healthy BNO055.
pub const EXPECTED_CHIP_ID: u8 = 0xA0;

/// Euler angles arrive in 1/16 degree; multiply by this and divide by
/// [`EULER_LSB_PER_DEGREE`] for millidegrees.
pub const MILLIDEGREES_PER_DEGREE: i32 = 1_000;
pub const EULER_LSB_PER_DEGREE: i32 = 16;

/// Error type for sensor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFault {
    /// The chip id never matched. Carries the last id read.
    IdentityMismatch(u8),
    /// System calibration did not complete within the poll bound.
    CalibrationTimeout,
    /// Bus transaction failed.
    Bus,
}

/// Sensor operating modes used during bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    /// Configuration mode, all fusion off.
    Config = 0x00,
    /// Nine degrees of freedom fusion with absolute heading.
    Ndof = 0x0C,
}

/// Register-level access to an absolute orientation sensor.
///
/// Implemented by [`crate::bno055::Bno055`] on hardware and by mocks in tests.
pub trait AttitudeSensor {
    /// Pulse the hardware reset line.
    fn reset(&mut self) -> Result<(), SensorFault>;

    /// Read the chip identification register.
    fn chip_id(&mut self) -> Result<u8, SensorFault>;

    fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), SensorFault>;

    /// Read the raw calibration status byte.
    fn calibration_status(&mut self) -> Result<u8, SensorFault>;

    /// Read six Euler bytes: yaw, roll, pitch as little-endian `i16`.
    fn read_euler_registers(&mut self) -> Result<[u8; 6], SensorFault>;
}

/// True when the system calibration bits (7:6) are both set.
#[inline]
#[must_use]
pub const fn system_calibrated(status: u8) -> bool {
    (status >> 6) & 0x03 == 0x03
}

/// Convert the six Euler bytes to a sample. Yaw is normalized into
/// `[0, 360000)`.
#[must_use]
pub fn decode_euler(raw: [u8; 6]) -> AttitudeSample {
    let to_mdeg = |lo: u8, hi: u8| {
        i32::from(i16::from_le_bytes([lo, hi])) * MILLIDEGREES_PER_DEGREE / EULER_LSB_PER_DEGREE
    };
    AttitudeSample {
        yaw: wrap_heading(to_mdeg(raw[0], raw[1])),
        roll: to_mdeg(raw[2], raw[3]),
        pitch: to_mdeg(raw[4], raw[5]),
    }
}

/// Owns the sensor and turns raw reads into attitude samples.
pub struct OrientationProvider<S, D> {
    sensor: S,
    delay: D,
    config: SensorConfig,
    polls: u32,
    last: AttitudeSample,
}

impl<S: AttitudeSensor, D: DelayNs> OrientationProvider<S, D> {
    pub fn new(sensor: S, delay: D, config: SensorConfig) -> Self {
        Self {
            sensor,
            delay,
            config,
            polls: 0,
            last: AttitudeSample::default(),
        }
    }

    /// Bring the sensor up: identify, switch to fusion mode, wait for
    /// calibration.
    ///
    /// Blocks on the delay provider for the whole sequence.
    ///
    /// # Errors
    ///
    /// - [`SensorFault::IdentityMismatch`] if no reset attempt yields the
    ///   expected chip id.
    /// - [`SensorFault::CalibrationTimeout`] if calibration does not finish.
    /// - [`SensorFault::Bus`] if a mode switch fails.
    pub fn init(&mut self) -> Result<(), SensorFault> {
        self.identify()?;

        self.sensor.set_operating_mode(OperatingMode::Config)?;
        self.delay.delay_ms(self.config.mode_switch_delay_ms);
        self.sensor.set_operating_mode(OperatingMode::Ndof)?;
        self.delay.delay_ms(self.config.mode_switch_delay_ms);
        info!("sensor in fusion mode, waiting for calibration");

        for poll in 0..self.config.calibration_polls {
            match self.sensor.calibration_status() {
                Ok(status) if system_calibrated(status) => {
                    info!("sensor calibrated after {} polls", poll + 1);
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => debug!("calibration read failed: {:?}", e),
            }
            self.delay.delay_ms(self.config.calibration_poll_ms);
        }

        error!("sensor calibration timed out");
        Err(SensorFault::CalibrationTimeout)
    }

    fn identify(&mut self) -> Result<(), SensorFault> {
        let mut last_id = 0;
        for attempt in 0..self.config.identify_attempts {
            if let Err(e) = self.sensor.reset() {
                warn!("sensor reset failed: {:?}", e);
            }
            self.delay.delay_ms(self.config.boot_delay_ms);

            match self.sensor.chip_id() {
                Ok(EXPECTED_CHIP_ID) => {
                    debug!("sensor identified on attempt {}", attempt + 1);
                    return Ok(());
                }
                Ok(id) => {
                    warn!("unexpected chip id {}", id);
                    last_id = id;
                }
                Err(e) => warn!("chip id read failed: {:?}", e),
            }
        }

        error!("sensor identification failed");
        Err(SensorFault::IdentityMismatch(last_id))
    }

    /// Read the current attitude.
    ///
    /// Every `telemetry_decimation`-th call also appends
    /// `(pitch, roll, setpoint.pitch, setpoint.roll)` to `recorder`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorFault::Bus`] if the register read fails. Nothing is
    /// recorded in that case.
    pub fn poll<const N: usize>(
        &mut self,
        setpoint: &ControlSetpoint,
        recorder: &mut TelemetryRecorder<N>,
    ) -> Result<AttitudeSample, SensorFault> {
        let sample = decode_euler(self.sensor.read_euler_registers()?);
        self.last = sample;

        self.polls = self.polls.wrapping_add(1);
        if self.polls % u32::from(self.config.telemetry_decimation.max(1)) == 0 {
            recorder.record(TelemetryRecord {
                pitch: sample.pitch,
                roll: sample.roll,
                pitch_setpoint: setpoint.pitch,
                roll_setpoint: setpoint.roll,
            });
        }

        Ok(sample)
    }

    /// The most recent successful sample.
    #[must_use]
    pub const fn last_sample(&self) -> AttitudeSample {
        self.last
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Decompose the provider into its sensor and delay.
    pub fn into_parts(self) -> (S, D) {
        (self.sensor, self.delay)
    }
}
