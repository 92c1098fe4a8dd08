//! UART-based packet source for the wireless link.
//!
//! Reads newline-terminated command packets from the HC-05 module. Parsing
//! happens later in the flight task so rejected packets are counted in one
//! place.
//!
//! # Pins
//!
//! Uses UART1:
//! - GPIO 8: TX
//! - GPIO 9: RX

use embassy_rp::uart::{Async, Error as UartError, UartRx};
use flight_core::{InputError, PacketLine, PacketSource};

/// Convert UART errors to [`InputError`].
///
/// This is a helper function instead of a `From` impl to avoid orphan rule issues
/// (both `UartError` and `InputError` are defined in external crates).
#[inline]
fn uart_error_to_input_error(e: UartError) -> InputError {
    match e {
        UartError::Framing => InputError::Framing,
        UartError::Overrun => InputError::BufferOverflow,
        _ => InputError::Io,
    }
}

/// UART-based source of raw command lines.
pub struct UartPacketSource<'d> {
    rx: UartRx<'d, Async>,
    buffer: PacketLine,
}

impl<'d> UartPacketSource<'d> {
    /// Create a new packet source from the given UART receiver.
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            buffer: PacketLine::new(),
        }
    }

    /// Read bytes until a newline is found or buffer is full.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded to prevent cascading parse errors on subsequent reads.
    async fn read_line(&mut self) -> Result<(), InputError> {
        self.buffer.clear();
        let mut byte = [0u8; 1];

        loop {
            self.rx
                .read(&mut byte)
                .await
                .map_err(uart_error_to_input_error)?;

            match byte[0] {
                b'\n' => return Ok(()),
                // HC-05 terminals often send CRLF
                b'\r' => continue,
                b => {
                    if self.buffer.push(b).is_err() {
                        self.discard_line(&mut byte).await?;
                        return Err(InputError::BufferOverflow);
                    }
                }
            }
        }
    }

    async fn discard_line(&mut self, byte: &mut [u8; 1]) -> Result<(), InputError> {
        loop {
            self.rx
                .read(byte)
                .await
                .map_err(uart_error_to_input_error)?;
            if byte[0] == b'\n' {
                return Ok(());
            }
        }
    }
}

impl PacketSource for UartPacketSource<'_> {
    async fn receive(&mut self) -> Result<PacketLine, InputError> {
        // Skip blank lines
        loop {
            self.read_line().await?;
            if !self.buffer.is_empty() {
                return Ok(self.buffer.clone());
            }
        }
    }

    fn is_connected(&self) -> bool {
        // The HC-05 gives no link state on these pins
        true
    }
}
