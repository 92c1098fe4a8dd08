//! FlightController: one control tick from sensor to actuators.

use crate::config::FlightConfig;
use crate::decoder::{CommandDecoder, DecodeError, DecodeOutcome};
use crate::input::{InputError, PacketSource};
use crate::mixer::{ArmingStep, ControlMixer, FlightMode, MixerError};
use crate::orientation::{AttitudeSensor, OrientationProvider, SensorFault};
use crate::output::{ActuatorSink, OutputError};
use crate::telemetry::TelemetryRecorder;
use crate::types::{ActuatorFrame, AttitudeSample, FlightState};
use embedded_hal::delay::DelayNs;

/// Error type for controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// The attitude read failed; actuators were not touched this tick.
    Sensor(SensorFault),
    /// Writing the actuator frame failed.
    Output(OutputError),
    /// The mixer refused the tick.
    Mixer(MixerError),
    /// The packet source failed.
    Input(InputError),
    /// A received packet was rejected.
    Decode(DecodeError),
}

impl From<SensorFault> for ControllerError {
    fn from(err: SensorFault) -> Self {
        ControllerError::Sensor(err)
    }
}

impl From<OutputError> for ControllerError {
    fn from(err: OutputError) -> Self {
        ControllerError::Output(err)
    }
}

impl From<MixerError> for ControllerError {
    fn from(err: MixerError) -> Self {
        ControllerError::Mixer(err)
    }
}

impl From<InputError> for ControllerError {
    fn from(err: InputError) -> Self {
        ControllerError::Input(err)
    }
}

impl From<DecodeError> for ControllerError {
    fn from(err: DecodeError) -> Self {
        ControllerError::Decode(err)
    }
}

/// Error type for blackbox dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DumpError {
    /// No dump has been requested.
    NotRequested,
    /// Armed with the motors live; try again once stopped.
    InFlight,
    /// The writer failed. The log and the request are kept.
    Write,
}

/// Owns every flight component and runs them in order.
///
/// All methods take `&mut self`, so a control tick, a packet and a dump
/// can never interleave.
///
/// # Error Handling
///
/// A failed sensor read skips the tick entirely: the previous pulse widths
/// stay on the outputs and the fault is counted.
pub struct FlightController<S, D, A, const N: usize> {
    provider: OrientationProvider<S, D>,
    decoder: CommandDecoder,
    mixer: ControlMixer,
    recorder: TelemetryRecorder<N>,
    state: FlightState,
    actuators: A,
    sensor_faults: u32,
}

impl<S, D, A, const N: usize> FlightController<S, D, A, N>
where
    S: AttitudeSensor,
    D: DelayNs,
    A: ActuatorSink,
{
    /// Create a controller from its hardware and configuration.
    pub fn new(sensor: S, delay: D, actuators: A, config: FlightConfig) -> Self {
        Self {
            provider: OrientationProvider::new(sensor, delay, config.sensor),
            decoder: CommandDecoder::new(config.effort_rate),
            mixer: ControlMixer::new(config),
            recorder: TelemetryRecorder::new(),
            state: FlightState::new(config.axis_pids()),
            actuators,
            sensor_faults: 0,
        }
    }

    /// Bring the attitude sensor up. Blocks until calibrated or failed.
    pub fn init(&mut self) -> Result<(), SensorFault> {
        self.provider.init()
    }

    /// Start the ESC arming sequence.
    pub fn begin_arming(&mut self) -> FlightMode {
        self.mixer.begin_arming()
    }

    /// Decode one packet against the most recent heading.
    pub fn handle_packet(&mut self, packet: &[u8]) -> Result<DecodeOutcome, DecodeError> {
        let yaw = self.provider.last_sample().yaw;
        let outcome = self.decoder.decode(
            packet,
            yaw,
            &mut self.state.setpoint,
            &mut self.state.flags,
        )?;
        if outcome.throttle_clamped {
            debug!("throttle clamped at {}", self.state.setpoint.throttle);
        }
        if outcome.dump_requested {
            info!("blackbox dump requested");
        }
        Ok(outcome)
    }

    /// Receive one packet from `source` and apply it.
    pub async fn process_one<P: PacketSource>(
        &mut self,
        source: &mut P,
    ) -> Result<DecodeOutcome, ControllerError> {
        let line = source.receive().await?;
        Ok(self.handle_packet(&line)?)
    }

    /// Run one control tick: poll, mix, write.
    ///
    /// Returns the mode after the tick.
    pub fn step(&mut self) -> Result<FlightMode, ControllerError> {
        let measured = match self
            .provider
            .poll(&self.state.setpoint, &mut self.recorder)
        {
            Ok(sample) => sample,
            Err(e) => {
                self.sensor_faults = self.sensor_faults.wrapping_add(1);
                warn!("attitude read failed: {:?}", e);
                return Err(e.into());
            }
        };

        if let Some(frame) = self.next_frame(&measured)? {
            self.actuators.write_frame(&frame)?;
        }

        Ok(self.mixer.mode())
    }

    fn next_frame(
        &mut self,
        measured: &AttitudeSample,
    ) -> Result<Option<ActuatorFrame>, MixerError> {
        match self.mixer.mode() {
            FlightMode::Idle => Ok(None),
            FlightMode::Arming => match self.mixer.arming_step(&mut self.state) {
                ArmingStep::Pending(frame) => Ok(Some(frame)),
                ArmingStep::Complete => Ok(Some(ActuatorFrame::uniform(
                    self.mixer.config().min_armed_pulse,
                ))),
            },
            FlightMode::Armed => self.mixer.tick(&mut self.state, measured).map(Some),
        }
    }

    /// True while armed with the stop latch released.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.mixer.mode() == FlightMode::Armed && !self.state.flags.stop
    }

    /// Stream the blackbox to `writer` if a dump was requested and the
    /// motors are not live.
    ///
    /// On success the log is cleared, the request is consumed and the
    /// number of records written is returned.
    pub fn service_dump<W: embedded_io::Write>(
        &mut self,
        writer: &mut W,
    ) -> Result<usize, DumpError> {
        if !self.state.flags.dump_requested {
            return Err(DumpError::NotRequested);
        }
        if self.in_flight() {
            return Err(DumpError::InFlight);
        }

        let written = self.recorder.write_to(writer).map_err(|e| {
            warn!("blackbox dump failed: {:?}", e);
            DumpError::Write
        })?;

        info!(
            "blackbox dumped {} records ({} dropped)",
            written,
            self.recorder.dropped()
        );
        self.recorder.clear();
        self.state.flags.dump_requested = false;
        Ok(written)
    }

    /// Return to `Idle`. Outputs keep their last value until the caller
    /// writes something else.
    pub fn disarm(&mut self) {
        self.mixer.disarm(&mut self.state);
    }

    #[must_use]
    pub fn mode(&self) -> FlightMode {
        self.mixer.mode()
    }

    #[must_use]
    pub fn state(&self) -> &FlightState {
        &self.state
    }

    #[must_use]
    pub fn recorder(&self) -> &TelemetryRecorder<N> {
        &self.recorder
    }

    #[must_use]
    pub fn decoder(&self) -> &CommandDecoder {
        &self.decoder
    }

    /// Failed attitude reads so far (wrapping).
    #[must_use]
    pub fn sensor_faults(&self) -> u32 {
        self.sensor_faults
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }

    pub fn provider_mut(&mut self) -> &mut OrientationProvider<S, D> {
        &mut self.provider
    }
}
