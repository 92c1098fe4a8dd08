//! Platform-agnostic quadcopter attitude control.
//!
//! This crate holds the whole closed control loop without any chip-specific
//! dependencies. It runs in embedded `no_std` environments and on the host
//! for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`types`]: Core data ([`AttitudeSample`], [`ControlSetpoint`], [`FlightState`], [`ActuatorFrame`])
//! - [`config`]: Tuning constants and [`FlightConfig`]
//! - [`decoder`]: Remote packets to setpoints ([`CommandDecoder`])
//! - [`pid`]: Integer PID controllers ([`PidState`], [`AxisPids`])
//! - [`mixer`]: Arming and motor mixing ([`ControlMixer`], [`FlightMode`])
//! - [`orientation`]: Sensor bring-up and polling ([`OrientationProvider`], [`AttitudeSensor`])
//! - [`bno055`]: BNO055 register driver over `embedded-hal` ([`Bno055`])
//! - [`telemetry`]: Blackbox log ([`TelemetryRecorder`])
//! - [`input`]: Packet source trait ([`PacketSource`])
//! - [`output`]: Actuator sink trait ([`ActuatorSink`])
//! - [`controller`]: Runs one control tick end to end ([`FlightController`])
//!
//! # Control Tick
//!
//! ```text
//! sensor ──poll──▶ AttitudeSample ──┐
//!                                   ├──▶ PID ──▶ mixer ──▶ clamp ──▶ actuators
//! link ──decode──▶ ControlSetpoint ─┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use flight_core::{CommandDecoder, CommandFlags, ControlSetpoint};
//!
//! let mut decoder = CommandDecoder::new(10);
//! let mut setpoint = ControlSetpoint::default();
//! let mut flags = CommandFlags::default();
//!
//! decoder
//!     .decode(b"#500,0,0,0,1000,0\n", 0, &mut setpoint, &mut flags)
//!     .unwrap();
//! assert_eq!(setpoint.roll, 10_000);
//! assert_eq!(setpoint.throttle, 10);
//! assert!(!flags.stop);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through `defmt` (for embedded logging)
//! - **`log`**: Log through the `log` facade
//! - **`heapless`**: Enable heapless Vec serialization in `quad-proto`
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This must go first so the logging macros are visible everywhere.
#[macro_use]
mod fmt;

pub mod bno055;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod input;
pub mod mixer;
pub mod orientation;
pub mod output;
pub mod pid;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use bno055::Bno055;
pub use config::{ArmingConfig, ConfigError, FlightConfig, SensorConfig};
pub use controller::{ControllerError, DumpError, FlightController};
pub use decoder::{CommandDecoder, DecodeError, DecodeOutcome};
pub use input::{InputError, PacketLine, PacketSource};
pub use mixer::{ArmingStep, ControlMixer, FlightMode, MixerError};
pub use orientation::{AttitudeSensor, OperatingMode, OrientationProvider, SensorFault};
pub use output::{ActuatorSink, OutputError};
pub use pid::{AxisEfforts, AxisPids, PidGains, PidState};
pub use telemetry::TelemetryRecorder;
pub use types::{
    ActuatorFrame, AttitudeSample, CommandFlags, ControlSetpoint, FlightState, Motor,
    TelemetryRecord,
};
