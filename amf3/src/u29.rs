//! AMF3 lengths, reference indices and integers share one variable width encoding: the U29. The
//! first three bytes each carry seven payload bits in network order and use their high bit to
//! signal that another byte follows. A fourth byte, if present, always terminates the number and
//! contributes all eight of its bits, which is how 3 * 7 + 8 = 29 bits fit into four bytes.

use crate::error::{DecodeError, EncodeError};
use std::io::{Read, Write};

/// Largest value representable as a U29
pub const MAX: u32 = 0x1fff_ffff;

/// Largest positive value of a signed integer folded into a U29
pub const MAX_SIGNED: i32 = 0x0fff_ffff;

/// Most negative value of a signed integer folded into a U29
pub const MIN_SIGNED: i32 = -0x1000_0000;

/// Returns the number of written bytes
pub fn encode<W: Write>(value: u32, w: &mut W) -> Result<usize, EncodeError> {
    let (buf, len): ([u8; 4], usize) = match value {
        v if v < 0x80 => ([v as u8, 0, 0, 0], 1),
        v if v < 0x4000 => ([(v >> 7) as u8 | 0x80, v as u8 & 0x7f, 0, 0], 2),
        v if v < 0x20_0000 => ([(v >> 14) as u8 | 0x80, (v >> 7) as u8 | 0x80, v as u8 & 0x7f, 0], 3),
        v if v <= MAX => ([(v >> 22) as u8 | 0x80, (v >> 15) as u8 | 0x80, (v >> 8) as u8 | 0x80, v as u8], 4),
        v => return Err(EncodeError::IntegerOverflow(v as u64)),
    };
    w.write_all(&buf[..len])?;
    Ok(len)
}

/// Returns the decoded value and the number of consumed bytes
pub fn decode<R: Read>(r: &mut R) -> Result<(u32, usize), DecodeError> {
    let mut value = 0u32;
    for i in 0..3 {
        let b = read_byte(r)?;
        value = (value << 7) | (b & 0x7f) as u32;
        if b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    let b = read_byte(r)?;
    Ok(((value << 8) | b as u32, 4))
}

/// Interprets a decoded U29 as a signed 29 bit two's complement integer.
pub fn to_i32(raw: u32) -> i32 {
    if raw > MAX_SIGNED as u32 {
        raw as i32 - 0x2000_0000
    } else {
        raw as i32
    }
}

/// Folds a signed integer into U29 space. Values outside of `MIN_SIGNED..=MAX_SIGNED` are
/// rejected, the encoder promotes them before they get here.
pub fn from_i32(value: i32) -> Result<u32, EncodeError> {
    if (MIN_SIGNED..=MAX_SIGNED).contains(&value) {
        Ok(value as u32 & MAX)
    } else {
        Err(EncodeError::IntegerOverflow(value as i64 as u64))
    }
}

fn read_byte<R: Read>(r: &mut R) -> Result<u8, DecodeError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bytes(value: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        let c = encode(value, &mut buf).unwrap();
        assert_eq!(c, buf.len());
        buf
    }

    #[test]
    fn boundaries() {
        let cases: &[(u32, &[u8])] = &[
            (0x00, &[0x00]),
            (0x7f, &[0x7f]),
            (0x80, &[0x81, 0x00]),
            (0x3fff, &[0xff, 0x7f]),
            (0x4000, &[0x81, 0x80, 0x00]),
            (0x1f_ffff, &[0xff, 0xff, 0x7f]),
            (0x20_0000, &[0x80, 0xc0, 0x80, 0x00]),
            (0x1fff_ffff, &[0xff, 0xff, 0xff, 0xff]),
        ];
        for (value, expected) in cases {
            assert_eq!(&bytes(*value), expected, "encoding {:#x}", value);
            let (decoded, c) = decode(&mut &expected[..]).unwrap();
            assert_eq!(decoded, *value);
            assert_eq!(c, expected.len());
        }
    }

    #[test]
    fn overflow() {
        assert!(matches!(encode(0x2000_0000, &mut Vec::new()), Err(EncodeError::IntegerOverflow(0x2000_0000))));
        assert!(matches!(encode(u32::MAX, &mut Vec::new()), Err(EncodeError::IntegerOverflow(_))));
    }

    #[test]
    fn fourth_byte_terminates() {
        // the high bit of the last byte is payload, not a continuation
        let mut input: &[u8] = &[0x80, 0x80, 0x80, 0xff, 0x42];
        assert_eq!(decode(&mut input).unwrap(), (0xff, 4));
        assert_eq!(input, [0x42]);
    }

    #[test]
    fn truncated() {
        let err = decode(&mut &[0x81, 0x80][..]).unwrap_err();
        assert!(err.is_eof());
        assert!(decode(&mut &[0u8; 0][..]).unwrap_err().is_eof());
    }

    #[test]
    fn signed_folding() {
        assert_eq!(from_i32(-1).unwrap(), 0x1fff_ffff);
        assert_eq!(to_i32(0x1fff_ffff), -1);
        assert_eq!(from_i32(MIN_SIGNED).unwrap(), 0x1000_0000);
        assert_eq!(to_i32(0x1000_0000), MIN_SIGNED);
        assert_eq!(to_i32(0x0fff_ffff), MAX_SIGNED);
        assert!(from_i32(MAX_SIGNED + 1).is_err());
        assert!(from_i32(MIN_SIGNED - 1).is_err());
    }

    proptest! {
        #[test]
        fn roundtrip(value in 0..=MAX) {
            let buf = bytes(value);
            prop_assert!(buf.len() <= 4);
            prop_assert_eq!(decode(&mut &buf[..]).unwrap(), (value, buf.len()));
        }

        #[test]
        fn signed_roundtrip(value in MIN_SIGNED..=MAX_SIGNED) {
            prop_assert_eq!(to_i32(from_i32(value).unwrap()), value);
        }
    }
}
