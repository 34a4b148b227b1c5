//! Geographic bounding box and coordinate input parsing

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::tiles::{DEFAULT_ZOOM, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON};
use crate::errors::{BoundsError, BoundsResult};

/// Longitude/latitude rectangle in degrees.
///
/// Always validated and normalized: `lon_min <= lon_max` and
/// `lat_min <= lat_max`, all finite and in range. Deserialized values are
/// checked by [`GeoBoundingBox::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundsCorners")]
pub struct GeoBoundingBox {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
}

#[derive(Deserialize)]
struct BoundsCorners {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
}

impl TryFrom<BoundsCorners> for GeoBoundingBox {
    type Error = BoundsError;

    fn try_from(corners: BoundsCorners) -> BoundsResult<Self> {
        Self::new(
            corners.lon_min,
            corners.lon_max,
            corners.lat_min,
            corners.lat_max,
        )
    }
}

impl GeoBoundingBox {
    /// Validate and normalize a bounding box given in any corner order
    ///
    /// # Errors
    ///
    /// Returns `BoundsError` if a longitude is outside [-180, 180] or a
    /// latitude is outside (-90, 90). The poles are rejected because the
    /// Mercator projection diverges there.
    pub fn new(lon_a: f64, lon_b: f64, lat_a: f64, lat_b: f64) -> BoundsResult<Self> {
        for value in [lon_a, lon_b] {
            if !value.is_finite() || !(MIN_LON..=MAX_LON).contains(&value) {
                return Err(BoundsError::LongitudeOutOfRange { value });
            }
        }
        for value in [lat_a, lat_b] {
            if !value.is_finite() || value <= MIN_LAT || value >= MAX_LAT {
                return Err(BoundsError::LatitudeOutOfRange { value });
            }
        }

        Ok(Self {
            lon_min: lon_a.min(lon_b),
            lon_max: lon_a.max(lon_b),
            lat_min: lat_a.min(lat_b),
            lat_max: lat_a.max(lat_b),
        })
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    /// Bounding box around a single point
    pub fn point(lon: f64, lat: f64) -> BoundsResult<Self> {
        Self::new(lon, lon, lat, lat)
    }

    /// Build a bounding box from user text such as `"11.0-11.1"` and `"46.0"`
    pub fn from_ranges(longitude: &str, latitude: &str) -> BoundsResult<Self> {
        let (lon_a, lon_b) = parse_degree_range(longitude)?;
        let (lat_a, lat_b) = parse_degree_range(latitude)?;
        Self::new(lon_a, lon_b, lat_a, lat_b)
    }
}

impl fmt::Display for GeoBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon {}..{}, lat {}..{}",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// Parse either a single value or a `min-max` range of degrees.
///
/// A `-` only separates two values when it directly follows a digit or a
/// decimal point, so negative values work on both sides: `"-10.5--9"`
/// yields `(-10.5, -9.0)`. A single value yields the same value twice.
pub fn parse_degree_range(input: &str) -> BoundsResult<(f64, f64)> {
    let text = input.trim();
    let invalid = || BoundsError::InvalidNumber {
        input: input.to_string(),
    };

    let separator = text.char_indices().skip(1).find_map(|(i, c)| {
        let previous = text[..i].trim_end().chars().last()?;
        (c == '-' && (previous.is_ascii_digit() || previous == '.')).then_some(i)
    });

    let parse = |part: &str| -> BoundsResult<f64> {
        let value: f64 = part.trim().parse().map_err(|_| invalid())?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid())
        }
    };

    match separator {
        Some(i) => Ok((parse(&text[..i])?, parse(&text[i + 1..])?)),
        None => {
            let value = parse(text)?;
            Ok((value, value))
        }
    }
}

/// Check a zoom level against the supported maximum
pub fn validate_zoom(zoom: u8) -> BoundsResult<u8> {
    if zoom > MAX_ZOOM {
        return Err(BoundsError::InvalidZoom {
            zoom,
            max: MAX_ZOOM,
        });
    }
    Ok(zoom)
}

/// Parse zoom text; blank input selects the default zoom
pub fn parse_zoom(input: &str) -> BoundsResult<u8> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(DEFAULT_ZOOM);
    }
    let zoom = text.parse::<u8>().map_err(|_| BoundsError::InvalidZoomText {
        input: input.to_string(),
    })?;
    validate_zoom(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value() {
        assert_eq!(parse_degree_range("11.0").unwrap(), (11.0, 11.0));
        assert_eq!(parse_degree_range("  46 ").unwrap(), (46.0, 46.0));
        assert_eq!(parse_degree_range("-73.5").unwrap(), (-73.5, -73.5));
    }

    #[test]
    fn test_range() {
        assert_eq!(parse_degree_range("11.0-11.1").unwrap(), (11.0, 11.1));
        assert_eq!(parse_degree_range("11 - 12").unwrap(), (11.0, 12.0));
        assert_eq!(parse_degree_range("5.-6").unwrap(), (5.0, 6.0));
    }

    #[test]
    fn test_negative_ranges() {
        assert_eq!(parse_degree_range("-10.5--9").unwrap(), (-10.5, -9.0));
        assert_eq!(parse_degree_range("-1-2").unwrap(), (-1.0, 2.0));
        assert_eq!(parse_degree_range("3--4").unwrap(), (3.0, -4.0));
    }

    #[test]
    fn test_exponent_is_not_a_separator() {
        assert_eq!(parse_degree_range("1e-3").unwrap(), (0.001, 0.001));
    }

    #[test]
    fn test_invalid_input() {
        for input in ["", "abc", "1-", "-", "1-2-3", "NaN", "inf"] {
            assert!(
                matches!(
                    parse_degree_range(input),
                    Err(BoundsError::InvalidNumber { .. })
                ),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_bounding_box_normalizes() {
        let bbox = GeoBoundingBox::new(11.1, 11.0, 46.1, 46.0).unwrap();
        assert_eq!(bbox.lon_min, 11.0);
        assert_eq!(bbox.lon_max, 11.1);
        assert_eq!(bbox.lat_min, 46.0);
        assert_eq!(bbox.lat_max, 46.1);
    }

    #[test]
    fn test_bounding_box_limits() {
        assert!(GeoBoundingBox::point(-180.0, 0.0).is_ok());
        assert!(GeoBoundingBox::point(180.0, 0.0).is_ok());
        assert!(matches!(
            GeoBoundingBox::point(180.5, 0.0),
            Err(BoundsError::LongitudeOutOfRange { .. })
        ));
        assert!(matches!(
            GeoBoundingBox::point(0.0, 90.0),
            Err(BoundsError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            GeoBoundingBox::point(0.0, -90.0),
            Err(BoundsError::LatitudeOutOfRange { .. })
        ));
        assert!(GeoBoundingBox::point(0.0, 89.9).is_ok());
    }

    #[test]
    fn test_from_ranges() {
        let bbox = GeoBoundingBox::from_ranges("11.0-11.1", "46.0-46.1").unwrap();
        assert_eq!((bbox.lon_min, bbox.lon_max), (11.0, 11.1));
        assert_eq!((bbox.lat_min, bbox.lat_max), (46.0, 46.1));

        assert!(GeoBoundingBox::from_ranges("11", "95").is_err());
    }

    #[test]
    fn test_zoom_parsing() {
        assert_eq!(parse_zoom("").unwrap(), DEFAULT_ZOOM);
        assert_eq!(parse_zoom(" 14 ").unwrap(), 14);
        assert!(matches!(
            parse_zoom("20"),
            Err(BoundsError::InvalidZoom { zoom: 20, .. })
        ));
        assert!(matches!(
            parse_zoom("twelve"),
            Err(BoundsError::InvalidZoomText { .. })
        ));
        assert!(matches!(
            parse_zoom("-1"),
            Err(BoundsError::InvalidZoomText { .. })
        ));
    }
}
