//! Coordinate transform module
//!
//! Converts geographic coordinates into continuous slippy-map tile
//! coordinates and geographic bounding boxes into integer tile rectangles.
//!
//! See <https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames>.

mod bounds;
mod types;

pub use bounds::{parse_degree_range, parse_zoom, validate_zoom, GeoBoundingBox};
pub use types::{TileIndex, TileIndexRect};

use std::f64::consts::PI;

use crate::errors::{BoundsError, BoundsResult};

/// Number of tiles along each axis at a zoom level (`2^zoom`)
#[inline]
pub fn grid_size(zoom: u8) -> f64 {
    2.0_f64.powi(i32::from(zoom))
}

/// Continuous tile x coordinate of a longitude.
///
/// `tile_x(-180, z) == 0` and `tile_x(180, z) == 2^z`.
#[inline]
pub fn tile_x(longitude: f64, zoom: u8) -> f64 {
    grid_size(zoom) * ((longitude + 180.0) / 360.0)
}

/// Continuous tile y coordinate of a latitude (Web Mercator).
///
/// Decreases as latitude increases; `tile_y(0, z) == 2^(z-1)`. Diverges at
/// the poles, which callers must reject beforehand.
#[inline]
pub fn tile_y(latitude: f64, zoom: u8) -> f64 {
    let lat_rad = latitude * PI / 180.0;
    let sec = 1.0 / lat_rad.cos();
    grid_size(zoom) * (1.0 - (lat_rad.tan() + sec).ln() / PI) / 2.0
}

/// Convert a bounding box into the rectangle of tiles covering it.
///
/// Each axis is transformed, sorted (latitude maps to y in reverse) and
/// floored to integer indices. Indices must land inside `[0, 2^zoom)`; a
/// longitude of exactly 180 or a latitude outside the Mercator band
/// (about ±85.0511°) is reported rather than clamped.
///
/// # Errors
///
/// Returns `BoundsError::InvalidZoom` for an unsupported zoom and
/// `BoundsError::TileOutOfRange` when an index leaves the grid.
pub fn to_tile_rect(bbox: &GeoBoundingBox, zoom: u8) -> BoundsResult<TileIndexRect> {
    validate_zoom(zoom)?;

    let (x_a, x_b) = sorted(tile_x(bbox.lon_min(), zoom), tile_x(bbox.lon_max(), zoom));
    let (y_a, y_b) = sorted(tile_y(bbox.lat_min(), zoom), tile_y(bbox.lat_max(), zoom));

    let x_min = to_index("x", x_a, zoom)?;
    let x_max = to_index("x", x_b, zoom)?;
    let y_min = to_index("y", y_a, zoom)?;
    let y_max = to_index("y", y_b, zoom)?;

    Ok(TileIndexRect::new(x_min, x_max, y_min, y_max))
}

fn sorted(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn to_index(axis: &'static str, value: f64, zoom: u8) -> BoundsResult<u32> {
    let size = 1_u32 << zoom;
    let index = value.floor();
    // NaN fails the range check too
    if !(0.0..f64::from(size)).contains(&index) {
        return Err(BoundsError::TileOutOfRange {
            axis,
            value: index,
            size,
            zoom,
        });
    }
    Ok(index as u32)
}
