//! Cache file path generation
//!
//! Tiles are stored flat in the cache root as `{zoom}-{x}.{y}.png`. The same
//! name is computed by the fetcher when writing and by the merger when
//! reading, so it must stay a pure function of its inputs.

use std::path::{Path, PathBuf};

use crate::app::geo::TileIndex;
use crate::constants::tiles::TILE_EXTENSION;

/// Path of a cached tile.
///
/// An empty `cache_root` means the current directory.
pub fn tile_cache_path(cache_root: &Path, tile: TileIndex, zoom: u8) -> PathBuf {
    let root = if cache_root.as_os_str().is_empty() {
        Path::new(".")
    } else {
        cache_root
    };
    root.join(tile_file_name(tile, zoom))
}

/// File name of a cached tile, without directory
pub fn tile_file_name(tile: TileIndex, zoom: u8) -> String {
    format!("{}-{}.{}.{}", zoom, tile.x, tile.y, TILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_file_name_format() {
        assert_eq!(tile_file_name(TileIndex::new(2173, 1457), 12), "12-2173.1457.png");
    }

    #[test]
    fn test_separator_normalization() {
        let tile = TileIndex::new(1, 2);
        let with_slash = tile_cache_path(Path::new("/tmp/.osmpng_cache/"), tile, 3);
        let without_slash = tile_cache_path(Path::new("/tmp/.osmpng_cache"), tile, 3);

        assert_eq!(with_slash, without_slash);
        assert_eq!(with_slash, PathBuf::from("/tmp/.osmpng_cache/3-1.2.png"));
    }

    #[test]
    fn test_empty_root_is_current_directory() {
        let path = tile_cache_path(Path::new(""), TileIndex::new(4, 5), 6);
        assert_eq!(path, PathBuf::from("./6-4.5.png"));
    }

    #[test]
    fn test_deterministic() {
        let root = Path::new("/var/cache/tiles");
        let tile = TileIndex::new(8692, 5822);
        assert_eq!(tile_cache_path(root, tile, 14), tile_cache_path(root, tile, 14));
    }

    #[test]
    fn test_injective_over_grid() {
        let root = Path::new("/cache");
        let mut seen = HashSet::new();

        for zoom in 0..4_u8 {
            let size = 1_u32 << zoom;
            for x in 0..size.max(12) {
                for y in 0..size.max(12) {
                    let path = tile_cache_path(root, TileIndex::new(x, y), zoom);
                    assert!(seen.insert(path.clone()), "duplicate path {:?}", path);
                }
            }
        }
    }

    #[test]
    fn test_digit_boundaries_do_not_collide() {
        let root = Path::new("/cache");
        let a = tile_cache_path(root, TileIndex::new(1, 12), 3);
        let b = tile_cache_path(root, TileIndex::new(11, 2), 3);
        let c = tile_cache_path(root, TileIndex::new(1, 12), 13);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
