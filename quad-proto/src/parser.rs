//! Line parsers for the quadcopter serial link.
//!
//! Supports two line types:
//! - Command packet (remote → aircraft): `#<lx>,<ly>,<rx>,<lt>,<rt>,<enter>\n`
//! - Dump line (aircraft → ground): `<pitch>,<pitch_set>,<roll>,<roll_set>\r\n`

use crate::types::{StickFrame, TelemetryLine, STICK_FULL_SCALE, TRIGGER_MAX};

/// Maximum line length accepted from the link (including newline).
pub const MAX_LINE_LENGTH: usize = 64;

/// First byte of every command packet.
pub const PACKET_MARKER: u8 = b'#';

/// Number of comma-separated fields in a command packet.
const PACKET_FIELDS: usize = 6;

/// Number of comma-separated fields in a dump line.
const DUMP_FIELDS: usize = 4;

/// Error type for line parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Command packet does not start with `#`.
    MissingMarker,
    /// Fewer fields than the format requires, or an empty field.
    MissingField,
    /// More fields than the format allows.
    ExtraField,
    /// A field is not a decimal integer or overflows `i32`.
    InvalidNumber,
    /// A field parsed but lies outside its joystick range.
    OutOfRange,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingMarker => write!(f, "missing '#' marker"),
            Self::MissingField => write!(f, "missing field"),
            Self::ExtraField => write!(f, "unexpected extra field"),
            Self::InvalidNumber => write!(f, "invalid number"),
            Self::OutOfRange => write!(f, "value out of range"),
        }
    }
}

/// Parse a command packet into a [`StickFrame`].
///
/// # Protocol Format
///
/// ```text
/// #<lx>,<ly>,<rx>,<lt>,<rt>,<enter>\n
/// ```
///
/// - `#` - Packet marker (mandatory)
/// - `lx,ly,rx` - Stick axes as signed decimal, `-1000..=1000`
/// - `lt,rt` - Triggers as decimal, `0..=1000`
/// - `enter` - Button, `0` or `1`
/// - `\n` - Line terminator (CR ignored if present)
///
/// Exactly six fields are required; a short packet is rejected rather than
/// filled with stale values.
///
/// # Example
///
/// ```text
/// #500,0,0,500,0,0\n
/// ```
///
/// This represents: left stick half right, left trigger half pressed.
pub fn parse_packet(line: &[u8]) -> Result<StickFrame, ParseError> {
    let line = strip_line_ending(line);

    let body = match line.split_first() {
        Some((&PACKET_MARKER, body)) => body,
        _ => return Err(ParseError::MissingMarker),
    };

    let mut fields = [0i32; PACKET_FIELDS];
    parse_fields(body, &mut fields)?;
    let [left_x, left_y, right_x, left_trigger, right_trigger, enter] = fields;

    for axis in [left_x, left_y, right_x] {
        if !(-STICK_FULL_SCALE..=STICK_FULL_SCALE).contains(&axis) {
            return Err(ParseError::OutOfRange);
        }
    }
    for trigger in [left_trigger, right_trigger] {
        if !(0..=TRIGGER_MAX).contains(&trigger) {
            return Err(ParseError::OutOfRange);
        }
    }
    let enter = match enter {
        0 => false,
        1 => true,
        _ => return Err(ParseError::OutOfRange),
    };

    Ok(StickFrame {
        left_x,
        left_y,
        right_x,
        left_trigger,
        right_trigger,
        enter,
    })
}

/// Parse one blackbox dump line back into a [`TelemetryLine`].
///
/// Used on the ground side when reading a dump captured from the link.
pub fn parse_telemetry_line(line: &[u8]) -> Result<TelemetryLine, ParseError> {
    let line = strip_line_ending(line);

    let mut fields = [0i32; DUMP_FIELDS];
    parse_fields(line, &mut fields)?;
    let [pitch, pitch_setpoint, roll, roll_setpoint] = fields;

    Ok(TelemetryLine {
        pitch,
        pitch_setpoint,
        roll,
        roll_setpoint,
    })
}

/// Split `body` on commas into exactly `out.len()` decimal fields.
fn parse_fields(body: &[u8], out: &mut [i32]) -> Result<(), ParseError> {
    let mut parts = body.split(|&b| b == b',');

    for slot in out.iter_mut() {
        let part = parts.next().ok_or(ParseError::MissingField)?;
        *slot = parse_i32(part)?;
    }

    if parts.next().is_some() {
        return Err(ParseError::ExtraField);
    }

    Ok(())
}

/// Strip trailing CR and/or LF from a line.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

/// Parse a decimal string as i32 (with optional leading whitespace and sign).
#[inline]
fn parse_i32(s: &[u8]) -> Result<i32, ParseError> {
    let s = trim_leading_whitespace(s);
    if s.is_empty() {
        return Err(ParseError::MissingField);
    }

    let (negative, digits) = match s[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    if digits.is_empty() {
        return Err(ParseError::InvalidNumber);
    }

    // Accumulate in i64 so i32::MIN parses without a special case
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(ParseError::InvalidNumber);
        }
        value = value * 10 + i64::from(b - b'0');
        if value > i64::from(i32::MAX) + 1 {
            return Err(ParseError::InvalidNumber);
        }
    }

    if negative {
        value = -value;
    }

    i32::try_from(value).map_err(|_| ParseError::InvalidNumber)
}

/// Trim leading ASCII whitespace (spaces).
#[inline]
fn trim_leading_whitespace(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&b| b != b' ').unwrap_or(s.len());
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_neutral() {
        let frame = parse_packet(b"#0,0,0,0,0,0\n").unwrap();
        assert_eq!(frame, StickFrame::neutral());
    }

    #[test]
    fn test_parse_all_fields() {
        let frame = parse_packet(b"#-1000,250,999,10,1000,1\r\n").unwrap();
        assert_eq!(frame.left_x, -1000);
        assert_eq!(frame.left_y, 250);
        assert_eq!(frame.right_x, 999);
        assert_eq!(frame.left_trigger, 10);
        assert_eq!(frame.right_trigger, 1000);
        assert!(frame.enter);
    }

    #[test]
    fn test_parse_without_line_ending() {
        let frame = parse_packet(b"#500,0,0,500,0,0").unwrap();
        assert_eq!(frame.left_x, 500);
        assert_eq!(frame.left_trigger, 500);
    }

    #[test]
    fn test_parse_leading_spaces_and_plus() {
        let frame = parse_packet(b"# 12,+34, -5,0,0,0\n").unwrap();
        assert_eq!(frame.left_x, 12);
        assert_eq!(frame.left_y, 34);
        assert_eq!(frame.right_x, -5);
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(parse_packet(b"0,0,0,0,0,0\n"), Err(ParseError::MissingMarker));
        assert_eq!(parse_packet(b"G0,0,0,0,0,0\n"), Err(ParseError::MissingMarker));
        assert_eq!(parse_packet(b""), Err(ParseError::MissingMarker));
        assert_eq!(parse_packet(b"\r\n"), Err(ParseError::MissingMarker));
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert_eq!(parse_packet(b"#1,2,3,4,5\n"), Err(ParseError::MissingField));
        assert_eq!(parse_packet(b"#\n"), Err(ParseError::MissingField));
        assert_eq!(parse_packet(b"#1,,3,4,5,6\n"), Err(ParseError::MissingField));
    }

    #[test]
    fn test_extra_fields_rejected() {
        assert_eq!(parse_packet(b"#0,0,0,0,0,0,0\n"), Err(ParseError::ExtraField));
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert_eq!(parse_packet(b"#0,abc,0,0,0,0\n"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_packet(b"#0,-,0,0,0,0\n"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_packet(b"#0,0,0,0,0,1 \n"), Err(ParseError::InvalidNumber));
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            parse_packet(b"#99999999999,0,0,0,0,0\n"),
            Err(ParseError::InvalidNumber)
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(parse_packet(b"#1001,0,0,0,0,0\n"), Err(ParseError::OutOfRange));
        assert_eq!(parse_packet(b"#0,-1001,0,0,0,0\n"), Err(ParseError::OutOfRange));
        assert_eq!(parse_packet(b"#0,0,0,-1,0,0\n"), Err(ParseError::OutOfRange));
        assert_eq!(parse_packet(b"#0,0,0,0,1001,0\n"), Err(ParseError::OutOfRange));
        assert_eq!(parse_packet(b"#0,0,0,0,0,2\n"), Err(ParseError::OutOfRange));
    }

    #[test]
    fn test_parse_i32_extremes() {
        assert_eq!(parse_i32(b"2147483647"), Ok(i32::MAX));
        assert_eq!(parse_i32(b"-2147483648"), Ok(i32::MIN));
        assert_eq!(parse_i32(b"2147483648"), Err(ParseError::InvalidNumber));
    }

    #[test]
    fn test_parse_telemetry_line() {
        let line = parse_telemetry_line(b"-1250,0,3000,10000\r\n").unwrap();
        assert_eq!(
            line,
            TelemetryLine {
                pitch: -1250,
                pitch_setpoint: 0,
                roll: 3000,
                roll_setpoint: 10000,
            }
        );
    }

    #[test]
    fn test_parse_telemetry_line_short() {
        assert_eq!(parse_telemetry_line(b"1,2,3\r\n"), Err(ParseError::MissingField));
    }
}
