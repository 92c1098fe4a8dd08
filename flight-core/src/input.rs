//! Packet source trait and error types.

use core::future::Future;
use quad_proto::MAX_LINE_LENGTH;

/// One raw line from the link, without its terminator.
pub type PacketLine = heapless::Vec<u8, MAX_LINE_LENGTH>;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// UART/communication I/O error.
    Io,
    /// Connection lost / timeout.
    Disconnected,
    /// Buffer overflow (line too long).
    BufferOverflow,
    /// UART framing error.
    Framing,
}

/// Async trait for command packet sources.
///
/// This trait abstracts the wireless link so the flight loop can be fed from
/// a UART, a radio module or a scripted test source alike.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait PacketSource {
    /// Wait for and receive the next complete line.
    ///
    /// This is an async operation that yields when no data is available.
    /// Parsing is left to the [`crate::CommandDecoder`].
    fn receive(&mut self) -> impl Future<Output = Result<PacketLine, InputError>>;

    /// Check if the link is connected/ready.
    fn is_connected(&self) -> bool;
}
