//! Encoded polyline codec
//!
//! Implements the variable-length, delta-encoded polyline format used by
//! mapping providers for route geometry. Each coordinate is stored as a signed
//! delta from the previous point, scaled by `10^precision`, zig-zag signed and
//! split into 5-bit groups with a continuation bit, each group offset by 63
//! into printable ASCII.
//!
//! Input is untrusted network text: every malformed byte sequence is reported
//! as a [`PolylineError`] and no partial point list is ever returned.

use thiserror::Error;

use crate::value_objects::Coordinate;

/// Precision used by the provider's directions API (1e5 scaling)
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest shift for a single value; allows 7 groups (35 bits)
const MAX_SHIFT: u32 = 30;

const ASCII_OFFSET: u8 = 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;

/// Errors produced while decoding an encoded polyline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolylineError {
    /// A byte outside the encoding alphabet (`?`..=`~`)
    #[error("Invalid polyline character {byte:#04x} at offset {offset}")]
    InvalidCharacter {
        /// Byte offset into the input
        offset: usize,
        /// The offending byte
        byte: u8,
    },

    /// The input ended in the middle of a value or after a lone latitude
    #[error("Polyline truncated at offset {offset}")]
    Truncated {
        /// Byte offset where more input was expected
        offset: usize,
    },

    /// A value used more groups than any valid coordinate needs
    #[error("Polyline value starting at offset {offset} overflows")]
    Overflow {
        /// Byte offset of the first group of the value
        offset: usize,
    },

    /// A decoded point lies outside the valid coordinate range
    #[error("Decoded point #{index} ({latitude}, {longitude}) is out of range")]
    OutOfRange {
        /// Index of the point in the decoded sequence
        index: usize,
        /// Decoded latitude
        latitude: f64,
        /// Decoded longitude
        longitude: f64,
    },

    /// Precision outside the supported 1..=7 range
    #[error("Unsupported polyline precision: {0}")]
    UnsupportedPrecision(u32),
}

/// Decode a polyline encoded with the default 1e5 precision
///
/// An empty string decodes to an empty point list.
///
/// # Errors
///
/// Returns a [`PolylineError`] for any truncated or invalid input.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decode a polyline encoded with `10^precision` scaling
///
/// # Errors
///
/// Returns a [`PolylineError`] for any truncated or invalid input, or for an
/// unsupported precision.
#[allow(clippy::cast_precision_loss)] // accumulated values stay well below 2^52
pub fn decode_with_precision(
    encoded: &str,
    precision: u32,
) -> Result<Vec<Coordinate>, PolylineError> {
    let factor = scale_factor(precision)?;
    let bytes = encoded.as_bytes();

    let mut cursor = 0usize;
    let mut latitude = 0i64;
    let mut longitude = 0i64;
    let mut points = Vec::with_capacity(bytes.len() / 4);

    while cursor < bytes.len() {
        let value_start = cursor;
        latitude = latitude
            .checked_add(read_value(bytes, &mut cursor)?)
            .ok_or(PolylineError::Overflow {
                offset: value_start,
            })?;

        if cursor >= bytes.len() {
            return Err(PolylineError::Truncated { offset: cursor });
        }

        let value_start = cursor;
        longitude = longitude
            .checked_add(read_value(bytes, &mut cursor)?)
            .ok_or(PolylineError::Overflow {
                offset: value_start,
            })?;

        let lat = latitude as f64 / factor;
        let lng = longitude as f64 / factor;
        let point = Coordinate::new(lat, lng).map_err(|_| PolylineError::OutOfRange {
            index: points.len(),
            latitude: lat,
            longitude: lng,
        })?;
        points.push(point);
    }

    Ok(points)
}

/// Encode points with the default 1e5 precision
#[must_use]
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    encode_into(points, 1e5, &mut out);
    out
}

/// Encode points with `10^precision` scaling
///
/// # Errors
///
/// Returns `PolylineError::UnsupportedPrecision` outside 1..=7.
pub fn encode_with_precision(
    points: &[Coordinate],
    precision: u32,
) -> Result<String, PolylineError> {
    let factor = scale_factor(precision)?;
    let mut out = String::with_capacity(points.len() * 8);
    encode_into(points, factor, &mut out);
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)] // valid coordinates scaled by <= 1e7 fit in i64
fn encode_into(points: &[Coordinate], factor: f64, out: &mut String) {
    let mut previous_lat = 0i64;
    let mut previous_lng = 0i64;

    for point in points {
        let lat = (point.latitude() * factor).round() as i64;
        let lng = (point.longitude() * factor).round() as i64;
        write_value(lat - previous_lat, out);
        write_value(lng - previous_lng, out);
        previous_lat = lat;
        previous_lng = lng;
    }
}

fn scale_factor(precision: u32) -> Result<f64, PolylineError> {
    if !(1..=7).contains(&precision) {
        return Err(PolylineError::UnsupportedPrecision(precision));
    }
    #[allow(clippy::cast_possible_wrap)] // precision <= 7
    Ok(10f64.powi(precision as i32))
}

/// Read one zig-zag encoded varint starting at `cursor`
fn read_value(bytes: &[u8], cursor: &mut usize) -> Result<i64, PolylineError> {
    let start = *cursor;
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*cursor) else {
            return Err(PolylineError::Truncated { offset: *cursor });
        };
        if !(ASCII_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                offset: *cursor,
                byte,
            });
        }
        *cursor += 1;

        let chunk = i64::from(byte - ASCII_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        if chunk & CONTINUATION_BIT == 0 {
            break;
        }

        shift += 5;
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: start });
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // groups are < 64
fn write_value(value: i64, out: &mut String) {
    let mut zigzag = if value < 0 { !(value << 1) } else { value << 1 };
    while zigzag >= CONTINUATION_BIT {
        let group = (CONTINUATION_BIT | (zigzag & CHUNK_MASK)) as u8 + ASCII_OFFSET;
        out.push(char::from(group));
        zigzag >>= 5;
    }
    out.push(char::from(zigzag as u8 + ASCII_OFFSET));
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference example from the provider documentation
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(38.5, -120.2).expect("valid"),
            Coordinate::new(40.7, -120.95).expect("valid"),
            Coordinate::new(43.252, -126.453).expect("valid"),
        ]
    }

    #[test]
    fn decodes_reference_polyline() {
        let points = decode(REFERENCE).expect("decodes");
        assert_eq!(points.len(), 3);
        for (decoded, expected) in points.iter().zip(reference_points()) {
            assert!(decoded.approx_eq(&expected, 1e-9), "{decoded} != {expected}");
        }
    }

    #[test]
    fn encodes_reference_polyline() {
        assert_eq!(encode(&reference_points()), REFERENCE);
    }

    #[test]
    fn empty_input_is_empty_route() {
        assert_eq!(decode("").expect("decodes"), Vec::new());
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn truncated_mid_value() {
        let cut = &REFERENCE[..REFERENCE.len() - 1];
        assert!(matches!(
            decode(cut),
            Err(PolylineError::Truncated { .. })
        ));
    }

    #[test]
    fn truncated_after_latitude() {
        assert_eq!(decode("_p~iF"), Err(PolylineError::Truncated { offset: 5 }));
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        assert_eq!(
            decode("_p~iF ps|U"),
            Err(PolylineError::InvalidCharacter {
                offset: 5,
                byte: b' '
            })
        );
    }

    #[test]
    fn rejects_multibyte_utf8() {
        let err = decode("_p~iFé").expect_err("non-ascii must fail");
        assert!(matches!(
            err,
            PolylineError::InvalidCharacter { offset: 5, byte: 0xC3 }
        ));
    }

    #[test]
    fn rejects_overlong_values() {
        assert!(matches!(
            decode("~~~~~~~~~~?"),
            Err(PolylineError::Overflow { offset: 0 })
        ));
    }

    #[test]
    fn rejects_out_of_range_points() {
        // A single latitude delta of 100 degrees
        let encoded = encode_with_precision(
            &[Coordinate::new_unchecked(100.0, 0.0)],
            DEFAULT_PRECISION,
        )
        .expect("encodes");
        assert!(matches!(
            decode(&encoded),
            Err(PolylineError::OutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn precision_six_round_trip() {
        let points = vec![
            Coordinate::new(19.432_608, -99.133_209).expect("valid"),
            Coordinate::new(20.006_686, -101.021_450).expect("valid"),
        ];
        let encoded = encode_with_precision(&points, 6).expect("encodes");
        let decoded = decode_with_precision(&encoded, 6).expect("decodes");
        for (a, b) in decoded.iter().zip(&points) {
            assert!(a.approx_eq(b, 1e-6));
        }
    }

    #[test]
    fn rejects_unsupported_precision() {
        assert_eq!(
            decode_with_precision("??", 0),
            Err(PolylineError::UnsupportedPrecision(0))
        );
        assert!(encode_with_precision(&[], 8).is_err());
    }
}
