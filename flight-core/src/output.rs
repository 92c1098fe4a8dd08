//! Actuator sink trait and error types.

use crate::types::{ActuatorFrame, Motor};

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Peripheral I/O error.
    Io,
    /// Pulse width outside what the timer can produce.
    OutOfRange,
}

/// Destination for motor pulse widths.
///
/// Writes are synchronous: a compare register update either lands before the
/// call returns or fails.
pub trait ActuatorSink {
    /// Set the pulse width of one motor channel.
    fn set_pulse_width(&mut self, motor: Motor, pulse: u16) -> Result<(), OutputError>;

    /// Write all four channels in channel order.
    ///
    /// Stops at the first failing channel.
    fn write_frame(&mut self, frame: &ActuatorFrame) -> Result<(), OutputError> {
        for (motor, pulse) in frame.iter() {
            self.set_pulse_width(motor, pulse)?;
        }
        Ok(())
    }
}
