//! Mosaic merge of cached tiles
//!
//! Reads every tile of a [`TileIndexRect`] from the cache, checks that all
//! tiles share the reference tile's dimensions and composites them into a
//! single RGB raster which is then encoded as PNG.
//!
//! A merge either produces the complete mosaic or nothing: tiles are all
//! read and placed before anything is written, and the encoder writes to a
//! temporary sibling that is renamed onto the destination only on success.

use std::path::{Path, PathBuf};

use image::{GenericImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::cache::tile_cache_path;
use crate::app::client::download::temp_path_for;
use crate::app::geo::{TileIndex, TileIndexRect};
use crate::errors::{MergeError, MergeResult};

/// Description of a written mosaic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MosaicSummary {
    /// Destination file
    pub path: PathBuf,
    /// Mosaic width in pixels
    pub width: u32,
    /// Mosaic height in pixels
    pub height: u32,
    /// Width of every source tile
    pub tile_width: u32,
    /// Height of every source tile
    pub tile_height: u32,
    /// Number of tiles composited
    pub tiles: u64,
}

/// Pixel buffer holding a grid of equally sized tiles
#[derive(Debug, Clone)]
pub struct MosaicRaster {
    image: RgbImage,
    rect: TileIndexRect,
    tile_width: u32,
    tile_height: u32,
}

impl MosaicRaster {
    /// Allocate a black raster large enough for `rect` of tiles of the given size
    ///
    /// # Errors
    ///
    /// Returns `MergeError::MosaicTooLarge` if the dimensions overflow
    pub fn new(rect: TileIndexRect, tile_width: u32, tile_height: u32) -> MergeResult<Self> {
        let too_large = || MergeError::MosaicTooLarge {
            columns: rect.columns(),
            rows: rect.rows(),
            tile_width,
            tile_height,
        };

        let width = tile_width.checked_mul(rect.columns()).ok_or_else(too_large)?;
        let height = tile_height.checked_mul(rect.rows()).ok_or_else(too_large)?;
        let bytes = u64::from(width) * u64::from(height) * 3;
        if usize::try_from(bytes).is_err() {
            return Err(too_large());
        }

        Ok(Self {
            image: RgbImage::new(width, height),
            rect,
            tile_width,
            tile_height,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn tile_dimensions(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Copy `source` into the cell of `tile`.
    ///
    /// Pixel `(px, py)` of the source lands at
    /// `(tile_width * (x - x_min) + px, tile_height * (y - y_min) + py)`.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::DimensionMismatch` if `source` is not exactly one
    /// tile in size, or `MergeError::Placement` if `tile` is outside the grid
    pub fn place(&mut self, tile: TileIndex, source: &RgbImage, path: &Path) -> MergeResult<()> {
        if source.dimensions() != (self.tile_width, self.tile_height) {
            return Err(MergeError::DimensionMismatch {
                tile,
                path: path.to_path_buf(),
                expected_width: self.tile_width,
                expected_height: self.tile_height,
                actual_width: source.width(),
                actual_height: source.height(),
            });
        }

        let (column, row) = self.rect.offset_of(tile).ok_or_else(|| MergeError::Placement {
            tile,
            source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            )),
        })?;
        let base_x = self.tile_width * column;
        let base_y = self.tile_height * row;

        self.image
            .copy_from(source, base_x, base_y)
            .map_err(|source| MergeError::Placement { tile, source })
    }

    /// Encode the raster as PNG at `destination`
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Encode` if the image cannot be written and
    /// `MergeError::Io` if it cannot be moved into place
    pub fn encode(&self, destination: &Path) -> MergeResult<()> {
        let temp_path = temp_path_for(destination);

        if let Err(source) = self.image.save_with_format(&temp_path, ImageFormat::Png) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(MergeError::Encode {
                path: destination.to_path_buf(),
                source,
            });
        }

        std::fs::rename(&temp_path, destination).map_err(|source| {
            let _ = std::fs::remove_file(&temp_path);
            MergeError::Io {
                path: destination.to_path_buf(),
                source,
            }
        })
    }

    /// Borrow the pixel buffer
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Read and composite every tile of `rect` from `cache_root`.
///
/// The tile at `(x_min, y_min)` fixes the tile size; tiles are then visited
/// with x as the outer loop and y as the inner loop.
///
/// # Errors
///
/// Returns `MergeError::TileRead` for a missing or undecodable tile and
/// `MergeError::DimensionMismatch` for a tile of the wrong size
pub fn merge_tiles(rect: &TileIndexRect, zoom: u8, cache_root: &Path) -> MergeResult<MosaicRaster> {
    let reference_path = tile_cache_path(cache_root, rect.origin(), zoom);
    let reference = open_tile(&reference_path)?;
    let (tile_width, tile_height) = reference.dimensions();

    let mut raster = MosaicRaster::new(*rect, tile_width, tile_height)?;
    debug!(
        width = raster.width(),
        height = raster.height(),
        tile_width,
        tile_height,
        "Allocated mosaic"
    );

    for tile in rect.iter() {
        let path = tile_cache_path(cache_root, tile, zoom);
        let source = if tile == rect.origin() {
            reference.clone()
        } else {
            open_tile(&path)?
        };
        raster.place(tile, &source, &path)?;
    }

    Ok(raster)
}

/// Merge the cached tiles of `rect` and write the mosaic to `destination`.
///
/// Nothing is written if any tile fails to load or has the wrong size.
pub fn merge(
    rect: &TileIndexRect,
    zoom: u8,
    cache_root: &Path,
    destination: &Path,
) -> MergeResult<MosaicSummary> {
    let raster = merge_tiles(rect, zoom, cache_root)?;
    raster.encode(destination)?;

    let (tile_width, tile_height) = raster.tile_dimensions();
    let summary = MosaicSummary {
        path: destination.to_path_buf(),
        width: raster.width(),
        height: raster.height(),
        tile_width,
        tile_height,
        tiles: rect.tile_count(),
    };
    info!(
        "Wrote {}x{} mosaic of {} tiles to {}",
        summary.width,
        summary.height,
        summary.tiles,
        destination.display()
    );
    Ok(summary)
}

fn open_tile(path: &Path) -> MergeResult<RgbImage> {
    let image = image::open(path).map_err(|source| MergeError::TileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}
