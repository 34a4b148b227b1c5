//! Tile index type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// One tile in the slippy-map grid at a given zoom.
///
/// `x` grows eastwards from the antimeridian, `y` grows southwards from the
/// northern edge of the Web-Mercator square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
}

impl TileIndex {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of tile indices.
///
/// Construction always normalizes the corners, so `x_min <= x_max` and
/// `y_min <= y_max` hold for every value of this type. Deserialized values
/// go through the same normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RectCorners")]
pub struct TileIndexRect {
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
}

#[derive(Deserialize)]
struct RectCorners {
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
}

impl From<RectCorners> for TileIndexRect {
    fn from(corners: RectCorners) -> Self {
        Self::new(corners.x_min, corners.x_max, corners.y_min, corners.y_max)
    }
}

impl TileIndexRect {
    /// Create a rectangle from two x and two y indices in any order
    pub fn new(x_a: u32, x_b: u32, y_a: u32, y_b: u32) -> Self {
        Self {
            x_min: x_a.min(x_b),
            x_max: x_a.max(x_b),
            y_min: y_a.min(y_b),
            y_max: y_a.max(y_b),
        }
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    /// Rectangle covering exactly one tile
    pub fn single(tile: TileIndex) -> Self {
        Self::new(tile.x, tile.x, tile.y, tile.y)
    }

    /// Number of tile columns (x axis)
    pub fn columns(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows (y axis)
    pub fn rows(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Total number of tiles in the rectangle
    pub fn tile_count(&self) -> u64 {
        u64::from(self.columns()) * u64::from(self.rows())
    }

    /// Top-left tile, used as the merge reference
    pub fn origin(&self) -> TileIndex {
        TileIndex::new(self.x_min, self.y_min)
    }

    pub fn contains(&self, tile: TileIndex) -> bool {
        (self.x_min..=self.x_max).contains(&tile.x) && (self.y_min..=self.y_max).contains(&tile.y)
    }

    /// Grid-relative position of a tile inside this rectangle
    pub fn offset_of(&self, tile: TileIndex) -> Option<(u32, u32)> {
        self.contains(tile)
            .then(|| (tile.x - self.x_min, tile.y - self.y_min))
    }

    /// Iterate all tiles with x as the outer loop and y as the inner loop.
    ///
    /// This is the order in which tiles are fetched and merged.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> + '_ {
        (self.x_min..=self.x_max)
            .flat_map(move |x| (self.y_min..=self.y_max).map(move |y| TileIndex::new(x, y)))
    }
}

impl fmt::Display for TileIndexRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x {}-{}, y {}-{} ({}x{} tiles)",
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max,
            self.columns(),
            self.rows()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let rect = TileIndexRect::new(9, 4, 2, 1);
        assert_eq!(rect.x_min, 4);
        assert_eq!(rect.x_max, 9);
        assert_eq!(rect.y_min, 1);
        assert_eq!(rect.y_max, 2);
        assert_eq!(rect.columns(), 6);
        assert_eq!(rect.rows(), 2);
        assert_eq!(rect.tile_count(), 12);
    }

    #[test]
    fn test_deserialized_rect_is_normalized() {
        let rect: TileIndexRect =
            toml::from_str("x_min = 5\nx_max = 1\ny_min = 3\ny_max = 2\n").unwrap();
        assert_eq!(rect, TileIndexRect::new(1, 5, 2, 3));
        assert_eq!(rect.columns(), 5);
        assert_eq!(rect.rows(), 2);
    }

    #[test]
    fn test_iteration_is_x_outer_y_inner() {
        let rect = TileIndexRect::new(10, 11, 20, 22);
        let tiles: Vec<_> = rect.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(
            tiles,
            vec![(10, 20), (10, 21), (10, 22), (11, 20), (11, 21), (11, 22)]
        );
    }

    #[test]
    fn test_single_tile_rect() {
        let rect = TileIndexRect::single(TileIndex::new(5, 6));
        assert_eq!(rect.tile_count(), 1);
        assert_eq!(rect.iter().collect::<Vec<_>>(), vec![TileIndex::new(5, 6)]);
        assert_eq!(rect.origin(), TileIndex::new(5, 6));
    }

    #[test]
    fn test_offset_of() {
        let rect = TileIndexRect::new(10, 12, 20, 21);
        assert_eq!(rect.offset_of(TileIndex::new(12, 21)), Some((2, 1)));
        assert_eq!(rect.offset_of(TileIndex::new(13, 21)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TileIndex::new(1, 2).to_string(), "(1, 2)");
        assert_eq!(
            TileIndexRect::new(1, 2, 3, 3).to_string(),
            "x 1-2, y 3-3 (2x1 tiles)"
        );
    }
}
