//! Blocking byte writer for the blackbox dump.
//!
//! The dump runs inside the flight task between ticks, so it writes straight
//! to the UART FIFO instead of going through DMA.

use embassy_rp::uart::{Async, Error as UartError, UartTx};
use embedded_io::ErrorKind;

/// `embedded_io::Write` over the link UART transmitter.
pub struct BlockingTx<'d> {
    tx: UartTx<'d, Async>,
}

impl<'d> BlockingTx<'d> {
    #[must_use]
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self { tx }
    }
}

#[inline]
fn uart_error_to_kind(e: UartError) -> ErrorKind {
    match e {
        UartError::Overrun => ErrorKind::OutOfMemory,
        _ => ErrorKind::Other,
    }
}

impl embedded_io::ErrorType for BlockingTx<'_> {
    type Error = ErrorKind;
}

impl embedded_io::Write for BlockingTx<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.blocking_write(buf).map_err(uart_error_to_kind)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush().map_err(uart_error_to_kind)
    }
}
