//! Line serialization for the quadcopter serial link.
//!
//! This module provides the [`Serialize`] trait for writing [`StickFrame`]
//! command packets (ground side) and [`TelemetryLine`] dump lines (aircraft
//! side) in the formats accepted by [`crate::parser`].
//!
//! # Example
//!
//! ```
//! use quad_proto::{Serialize, TelemetryLine};
//!
//! let line = TelemetryLine { pitch: -62, pitch_setpoint: 0, roll: 125, roll_setpoint: 10000 };
//! let mut buf = [0u8; 64];
//! let len = line.serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"-62,0,125,10000\r\n");
//! ```

use crate::format::{write_i32, MAX_I32_LEN};
use crate::parser::PACKET_MARKER;
use crate::types::{StickFrame, TelemetryLine};

/// Cursor over the output buffer.
///
/// Callers check the buffer against the worst-case message size up front,
/// so individual writes never run past the end.
struct SerializeBuf<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SerializeBuf<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn write(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos += 1;
    }

    #[inline]
    fn write_slice(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    /// Write i32 decimal.
    #[inline]
    fn write_i32(&mut self, value: i32) {
        let mut tmp = [0u8; MAX_I32_LEN];
        let len = write_i32(&mut tmp, value);
        self.write_slice(&tmp[..len]);
    }

    /// Write comma-separated values.
    #[inline]
    fn write_fields(&mut self, values: &[i32]) {
        for (i, &value) in values.iter().enumerate() {
            if i > 0 {
                self.write(b',');
            }
            self.write_i32(value);
        }
    }

    #[inline]
    fn finish(self) -> usize {
        self.pos
    }
}

/// Maximum size of a serialized command packet.
///
/// Breakdown: #(1) + 6*i32(66) + 5*comma(5) + \n(1) = 73
/// We use 80 for safety margin.
pub const MAX_PACKET_SIZE: usize = 80;

/// Maximum size of a serialized dump line.
///
/// Breakdown: 4*i32(44) + 3*comma(3) + \r\n(2) = 49
/// We use 56 for safety margin.
pub const MAX_DUMP_LINE_SIZE: usize = 56;

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized message.
    BufferTooSmall,
    /// A write operation failed (for I/O adapters).
    WriteError,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Extension trait for serializing protocol lines.
///
/// Implementors only provide [`Serialize::serialize`] and their worst-case
/// size; the other targets are derived from it.
pub trait Serialize {
    /// Worst-case serialized size, used to size scratch buffers.
    const MAX_SIZE: usize;

    /// Serialize to the provided buffer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is shorter
    /// than [`Serialize::MAX_SIZE`].
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError>;

    /// Serialize to a `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if `N` is not large enough.
    #[cfg(feature = "heapless")]
    fn serialize_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        let mut vec = heapless::Vec::new();
        // Resize to full capacity to allow serialize() to write
        vec.resize(N, 0)
            .map_err(|_| SerializeError::BufferTooSmall)?;
        let len = self.serialize(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }

    /// Serialize to a `core::fmt::Write` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = self.serialize(&mut buf)?;

        let s = core::str::from_utf8(&buf[..len]).map_err(|_| SerializeError::WriteError)?;
        writer.write_str(s).map_err(|_| SerializeError::WriteError)
    }

    /// Serialize to an `embedded_io::Write` implementation.
    ///
    /// This is how the blackbox is streamed out over the UART.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    fn serialize_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = self.serialize(&mut buf)?;
        writer
            .write_all(&buf[..len])
            .map_err(|_| SerializeError::WriteError)
    }
}

impl Serialize for StickFrame {
    const MAX_SIZE: usize = MAX_PACKET_SIZE;

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < Self::MAX_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut sb = SerializeBuf::new(buf);
        sb.write(PACKET_MARKER);
        sb.write_fields(&[
            self.left_x,
            self.left_y,
            self.right_x,
            self.left_trigger,
            self.right_trigger,
            i32::from(self.enter),
        ]);
        sb.write(b'\n');

        Ok(sb.finish())
    }
}

impl Serialize for TelemetryLine {
    const MAX_SIZE: usize = MAX_DUMP_LINE_SIZE;

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < Self::MAX_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut sb = SerializeBuf::new(buf);
        sb.write_fields(&[
            self.pitch,
            self.pitch_setpoint,
            self.roll,
            self.roll_setpoint,
        ]);
        sb.write_slice(b"\r\n");

        Ok(sb.finish())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::parser::{parse_packet, parse_telemetry_line};

    #[test]
    fn test_serialize_neutral_packet() {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = StickFrame::neutral().serialize(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"#0,0,0,0,0,0\n");
    }

    #[test]
    fn test_serialize_packet_parses_back() {
        let frame = StickFrame {
            left_x: 500,
            left_y: -1000,
            right_x: 30,
            left_trigger: 500,
            right_trigger: 0,
            enter: true,
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = frame.serialize(&mut buf).unwrap();

        assert_eq!(&buf[..len], b"#500,-1000,30,500,0,1\n");
        assert_eq!(parse_packet(&buf[..len]), Ok(frame));
    }

    #[test]
    fn test_serialize_dump_line() {
        let line = TelemetryLine {
            pitch: 1,
            pitch_setpoint: 2,
            roll: -3,
            roll_setpoint: 4,
        };
        let mut buf = [0u8; MAX_DUMP_LINE_SIZE];
        let len = line.serialize(&mut buf).unwrap();

        assert_eq!(&buf[..len], b"1,2,-3,4\r\n");
        assert_eq!(parse_telemetry_line(&buf[..len]), Ok(line));
    }

    #[test]
    fn test_serialize_dump_line_extremes_fit() {
        let line = TelemetryLine {
            pitch: i32::MIN,
            pitch_setpoint: i32::MIN,
            roll: i32::MIN,
            roll_setpoint: i32::MIN,
        };
        let mut buf = [0u8; MAX_DUMP_LINE_SIZE];
        let len = line.serialize(&mut buf).unwrap();
        assert!(len <= MAX_DUMP_LINE_SIZE);
        assert_eq!(parse_telemetry_line(&buf[..len]), Ok(line));
    }

    #[test]
    fn test_serialize_buffer_too_small() {
        let mut buf = [0u8; 10];
        assert_eq!(
            StickFrame::neutral().serialize(&mut buf),
            Err(SerializeError::BufferTooSmall)
        );
        assert_eq!(
            TelemetryLine::default().serialize(&mut buf),
            Err(SerializeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_serialize_fmt_packet() {
        let mut s = std::string::String::new();
        StickFrame::neutral().serialize_fmt(&mut s).unwrap();
        assert_eq!(s, "#0,0,0,0,0,0\n");
    }

    #[test]
    fn test_serialize_fmt_dump_line() {
        let mut s = std::string::String::new();
        TelemetryLine::default().serialize_fmt(&mut s).unwrap();
        assert_eq!(s, "0,0,0,0\r\n");
    }
}
