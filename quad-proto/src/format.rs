//! No-std compatible number formatting for the serial protocols.
//!
//! Decimal integers are written straight into byte buffers without heap
//! allocation or `core::fmt`.

/// Longest decimal rendering of an `i32` (`-2147483648`).
pub const MAX_I32_LEN: usize = 11;

/// Write an i32 as a signed decimal string.
///
/// Returns the number of bytes written (1-11 bytes).
///
/// # Panics
///
/// Panics if the rendered value does not fit in `buf`. Callers size their
/// scratch buffers with [`MAX_I32_LEN`].
#[inline]
pub fn write_i32(buf: &mut [u8], value: i32) -> usize {
    if value == 0 {
        buf[0] = b'0';
        return 1;
    }

    let mut pos = 0;
    if value < 0 {
        buf[0] = b'-';
        pos = 1;
    }

    // unsigned_abs keeps i32::MIN representable
    let mut n = value.unsigned_abs();
    let mut temp = [0u8; 10];
    let mut len = 0;
    while n > 0 {
        temp[len] = b'0' + (n % 10) as u8;
        n /= 10;
        len += 1;
    }

    for i in (0..len).rev() {
        buf[pos] = temp[i];
        pos += 1;
    }

    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_i32() {
        let mut buf = [0u8; MAX_I32_LEN];

        let len = write_i32(&mut buf, 0);
        assert_eq!(&buf[..len], b"0");

        let len = write_i32(&mut buf, 7);
        assert_eq!(&buf[..len], b"7");

        let len = write_i32(&mut buf, -1);
        assert_eq!(&buf[..len], b"-1");

        let len = write_i32(&mut buf, 359_937);
        assert_eq!(&buf[..len], b"359937");

        let len = write_i32(&mut buf, -20_000);
        assert_eq!(&buf[..len], b"-20000");
    }

    #[test]
    fn test_write_i32_extremes() {
        let mut buf = [0u8; MAX_I32_LEN];

        let len = write_i32(&mut buf, i32::MAX);
        assert_eq!(&buf[..len], b"2147483647");

        let len = write_i32(&mut buf, i32::MIN);
        assert_eq!(&buf[..len], b"-2147483648");
        assert_eq!(len, MAX_I32_LEN);
    }
}
