//! Serial link protocol for the quadcopter: command packets and blackbox dumps.
//!
//! This crate provides everything needed to work with the text lines that
//! cross the wireless serial link:
//!
//! - **Types**: Wire-level data structures
//!   - [`StickFrame`] - One joystick snapshot from the remote
//!   - [`TelemetryLine`] - One blackbox record on its way to the ground
//!
//! - **Parsing**: Parse incoming lines
//!   - [`parse_packet()`] - Parse a command packet
//!   - [`parse_telemetry_line()`] - Parse a dump line (ground side)
//!
//! - **Serialization**: Write outgoing lines
//!   - [`Serialize`] trait - Buffer, `core::fmt`, `heapless` and `embedded-io` targets
//!
//! # Protocol Format
//!
//! ## Command Packet
//!
//! ```text
//! #<lx>,<ly>,<rx>,<lt>,<rt>,<enter>\n
//! ```
//!
//! - `#` - Packet marker
//! - `lx,ly,rx` - Stick axes as signed decimal, `-1000..=1000`
//! - `lt,rt` - Triggers as decimal, `0..=1000`
//! - `enter` - Dump button, `0` or `1`
//!
//! ## Dump Line
//!
//! ```text
//! <pitch>,<pitch_setpoint>,<roll>,<roll_setpoint>\r\n
//! ```
//!
//! All values are decimal millidegrees.
//!
//! # Examples
//!
//! ## Parsing Packets
//!
//! ```
//! use quad_proto::{parse_packet, StickFrame};
//!
//! let frame = parse_packet(b"#500,0,0,500,0,0\n").unwrap();
//! assert_eq!(frame.left_x, 500);
//! assert_eq!(frame.trigger_balance(), -500);
//! assert!(!frame.enter);
//! ```
//!
//! ## Serializing Packets
//!
//! ```
//! use quad_proto::{Serialize, StickFrame, MAX_PACKET_SIZE};
//!
//! let frame = StickFrame { right_trigger: 1000, ..StickFrame::neutral() };
//! let mut buf = [0u8; MAX_PACKET_SIZE];
//! let len = frame.serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"#0,0,0,0,1000,0\n");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`heapless`**: Enable `serialize_to_vec()`
//! - **`embedded-io`**: Enable `serialize_io()` for I/O peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod format;
pub mod parser;
pub mod serialize;
pub mod types;

// Re-export types at crate root for convenience
pub use parser::{parse_packet, parse_telemetry_line, ParseError, MAX_LINE_LENGTH, PACKET_MARKER};
pub use serialize::{Serialize, SerializeError, MAX_DUMP_LINE_SIZE, MAX_PACKET_SIZE};
pub use types::{StickFrame, TelemetryLine, STICK_FULL_SCALE, TRIGGER_MAX};
