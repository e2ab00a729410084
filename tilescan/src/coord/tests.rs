//! Tests for coordinate conversion and tile bounds

use super::*;

#[test]
fn test_london_at_zoom_10() {
    // London: 51.5074°N, 0.1278°W
    let tile = to_tile_coords(51.5074, -0.1278, 10).unwrap();
    assert_eq!(tile.y, 340);
    assert_eq!(tile.x, 511);
    assert_eq!(tile.zoom, 10);
}

#[test]
fn test_equator_prime_meridian() {
    // At zoom 1: 2×2 tiles, 0°N 0°E sits on the corner shared by all four
    let tile = to_tile_coords(0.0, 0.0, 1).unwrap();
    assert_eq!(tile.x, 1);
    assert_eq!(tile.y, 1);
}

#[test]
fn test_zoom_zero_is_single_tile() {
    let tile = to_tile_coords(45.0, 90.0, 0).unwrap();
    assert_eq!((tile.x, tile.y), (0, 0));
}

#[test]
fn test_world_edges_clamp_to_last_tile() {
    let east = to_tile_coords(0.0, 180.0, 3).unwrap();
    assert_eq!(east.x, 7);

    let south = to_tile_coords(MIN_LAT, 0.0, 3).unwrap();
    assert_eq!(south.y, 7);
}

#[test]
fn test_invalid_latitude() {
    assert!(matches!(
        to_tile_coords(90.0, 0.0, 10),
        Err(CoordError::InvalidLatitude(_))
    ));
    assert!(matches!(
        to_tile_coords(-90.0, 0.0, 10),
        Err(CoordError::InvalidLatitude(_))
    ));
}

#[test]
fn test_invalid_longitude() {
    assert!(matches!(
        to_tile_coords(0.0, 181.0, 10),
        Err(CoordError::InvalidLongitude(_))
    ));
    assert!(matches!(
        to_tile_coords(0.0, -181.0, 10),
        Err(CoordError::InvalidLongitude(_))
    ));
}

#[test]
fn test_invalid_zoom() {
    assert!(matches!(
        to_tile_coords(0.0, 0.0, MAX_ZOOM + 1),
        Err(CoordError::InvalidZoom(_))
    ));
}

#[test]
fn test_roundtrip_at_different_zooms() {
    let lat = 51.5074;
    let lon = -0.1278;

    for zoom in [0, 5, 10, 15, 18] {
        let tile = to_tile_coords(lat, lon, zoom).unwrap();
        let (converted_lat, converted_lon) = tile_to_lat_lon(&tile);

        // tile_to_lat_lon returns the northwest corner, so allow one tile of slack
        let tile_size_degrees = 360.0 / (2.0_f64.powi(zoom as i32));

        assert!(
            (converted_lat - lat).abs() < tile_size_degrees,
            "Zoom {}: lat diff {} exceeds tile size {}",
            zoom,
            (converted_lat - lat).abs(),
            tile_size_degrees
        );
        assert!((converted_lon - lon).abs() < tile_size_degrees);
    }
}

#[test]
fn test_tile_key_format() {
    let tile = TileCoord::new(1818, 806, 11);
    assert_eq!(tile.key(), "1818-806-11");
    assert_eq!(tile.to_string(), tile.key());
}

#[test]
fn test_bounds_are_normalized_for_any_corner_order() {
    let zoom = 11;
    let boxes = [
        GeoBoundingBox::new(35.60, 139.60, 35.80, 139.90),
        GeoBoundingBox::new(35.80, 139.90, 35.60, 139.60),
        GeoBoundingBox::new(35.60, 139.90, 35.80, 139.60),
        GeoBoundingBox::new(-33.95, 18.35, -33.85, 18.50),
    ];

    for bbox in boxes {
        let bounds = TileBounds::from_geo(&bbox, zoom).unwrap();
        assert!(bounds.min_x <= bounds.max_x, "{bbox}: {bounds}");
        assert!(bounds.min_y <= bounds.max_y, "{bbox}: {bounds}");
    }
}

#[test]
fn test_swapped_corners_give_same_bounds() {
    let a = GeoBoundingBox::new(35.60, 139.60, 35.80, 139.90);
    let b = GeoBoundingBox::new(35.80, 139.90, 35.60, 139.60);

    assert_eq!(
        TileBounds::from_geo(&a, 12).unwrap(),
        TileBounds::from_geo(&b, 12).unwrap()
    );
}

#[test]
fn test_tile_count_is_inclusive() {
    let bounds = TileBounds::from_corners(TileCoord::new(10, 20, 5), TileCoord::new(12, 21, 5));

    assert_eq!(bounds.width(), 3);
    assert_eq!(bounds.height(), 2);
    assert_eq!(bounds.tile_count(), 6);
}

#[test]
fn test_inverted_bounds_do_not_underflow() {
    let bounds = TileBounds {
        min_x: 12,
        min_y: 21,
        max_x: 10,
        max_y: 20,
        zoom: 5,
    };

    assert_eq!(bounds.width(), 1);
    assert_eq!(bounds.height(), 1);
    assert_eq!(bounds.tile_count(), 1);
    assert_eq!(bounds.tiles().collect::<Vec<_>>(), vec![TileCoord::new(12, 21, 5)]);
}

#[test]
fn test_single_tile_bounds() {
    let bbox = GeoBoundingBox::new(51.50, -0.13, 51.51, -0.12);
    let bounds = TileBounds::from_geo(&bbox, 4).unwrap();

    assert_eq!(bounds.tile_count(), 1);
    assert_eq!(bounds.tiles().count(), 1);
}

#[test]
fn test_tiles_iterates_every_cell_once() {
    let bounds = TileBounds::from_corners(TileCoord::new(3, 7, 6), TileCoord::new(5, 9, 6));
    let tiles: Vec<_> = bounds.tiles().collect();

    assert_eq!(tiles.len(), bounds.tile_count());
    assert_eq!(bounds.tiles().len(), 9);
    assert_eq!(tiles[0], TileCoord::new(3, 7, 6));
    assert_eq!(tiles[1], TileCoord::new(3, 8, 6));
    assert_eq!(tiles[3], TileCoord::new(4, 7, 6));
    assert_eq!(tiles[8], TileCoord::new(5, 9, 6));

    let unique: std::collections::HashSet<_> = tiles.iter().collect();
    assert_eq!(unique.len(), tiles.len());
    assert!(tiles.iter().all(|t| bounds.contains(t)));
}

#[test]
fn test_bbox_validation() {
    assert!(GeoBoundingBox::new(10.0, 10.0, 20.0, 20.0).validate().is_ok());
    assert!(matches!(
        GeoBoundingBox::new(10.0, 10.0, 89.0, 20.0).validate(),
        Err(CoordError::InvalidLatitude(_))
    ));
    assert!(matches!(
        GeoBoundingBox::new(10.0, -200.0, 20.0, 20.0).validate(),
        Err(CoordError::InvalidLongitude(_))
    ));
}
