//! Quadcopter flight controller for RP2040.
//!
//! This crate wires the platform-agnostic [`flight_core`] loop to the
//! RP2040 peripherals.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Brings up the BNO055 over I2C and waits for it to calibrate
//! 2. Arms the ESCs once the operator moves the roll stick
//! 3. Runs the attitude loop every 10 ms: IMU → PID → mixer → PWM
//! 4. Streams the blackbox over the link when asked and not flying
//!
//! See [`board`] for the pin map.
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two tasks:
//!
//! - **Link Task**: Reads command lines from the UART into a bounded
//!   [`Channel`](embassy_sync::channel::Channel)
//! - **Flight Task**: Owns the [`FlightController`](flight_core::FlightController),
//!   applies queued packets and runs the arming and control tickers
//!
//! A full channel drops the newest packet and counts it; the flight task
//! keeps using the last setpoint until something new arrives.
//!
//! # Modules
//!
//! - [`uart_input`]: UART packet source ([`UartPacketSource`])
//! - [`pwm_output`]: PWM motor outputs ([`PwmActuators`])
//! - [`dump_output`]: Blocking writer for the blackbox ([`BlockingTx`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`flight_core`] that the
//! binary needs, so it only depends on this crate.

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

// Re-export core types for convenience
pub use flight_core::{
    ActuatorFrame, ActuatorSink, Bno055, ControllerError, DumpError, FlightConfig,
    FlightController, FlightMode, InputError, PacketLine, PacketSource, SensorFault,
};

pub mod board;
pub mod dump_output;
pub mod pwm_output;
pub mod uart_input;

pub use dump_output::BlockingTx;
pub use pwm_output::{esc_config, PwmActuators};
pub use uart_input::UartPacketSource;
