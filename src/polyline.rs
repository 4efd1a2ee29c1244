//! Encoded polyline codec and the decoded route geometry type.
//!
//! Implements Google's encoded polyline algorithm: each coordinate is stored
//! as a delta from the previous one, scaled by `10^precision`, zigzag-folded
//! so the sign lives in bit 0, and split into 5-bit groups emitted as ASCII
//! characters offset by 63. Bit 0x20 marks that another group follows.
//!
//! See <https://developers.google.com/maps/documentation/utilities/polylinealgorithm>.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::LatLng;

/// Precision used by OSRM and Google for `geometries=polyline`.
pub const DEFAULT_PRECISION: u32 = 5;

const CHAR_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const GROUP_MASK: u64 = 0x1f;
/// Largest shift that still fits a decoded value into 64 bits.
const MAX_SHIFT: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid character {character:?} at byte {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("polyline ends in the middle of a value")]
    Truncated,
    #[error("value starting at byte {index} is too long")]
    Overflow { index: usize },
}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<LatLng>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        decode(encoded, precision).map(Self::new)
    }

    /// Encodes the points back into the compact string form.
    pub fn encode(&self, precision: u32) -> String {
        encode(&self.points, precision)
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<LatLng> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Decodes `encoded` into coordinates, dividing by `10^precision`.
///
/// An empty string decodes to an empty sequence.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<LatLng>, PolylineError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(PolylineError::Truncated);
        }
        lng += next_value(bytes, &mut index)?;

        points.push(LatLng::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(points)
}

/// Encodes `points` with `10^precision` scaling.
pub fn encode(points: &[LatLng], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.lat * factor).round() as i64;
        let lng = (point.lng * factor).round() as i64;
        push_value(&mut encoded, lat - prev_lat);
        push_value(&mut encoded, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PolylineError::Truncated);
        };
        if !(CHAR_OFFSET..=CHAR_OFFSET + 0x3f).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                index: *index,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { index: start });
        }
        *index += 1;

        let chunk = u64::from(byte - CHAR_OFFSET);
        result |= (chunk & GROUP_MASK) << shift;
        shift += 5;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    // zigzag: bit 0 carries the sign
    let magnitude = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !magnitude } else { magnitude })
}

fn push_value(out: &mut String, value: i64) {
    let mut folded = if value < 0 {
        !((value as u64) << 1)
    } else {
        (value as u64) << 1
    };

    while folded >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (folded & GROUP_MASK)) as u8;
        out.push((chunk + CHAR_OFFSET) as char);
        folded >>= 5;
    }
    out.push((folded as u8 + CHAR_OFFSET) as char);
}
