use proptest::prelude::*;
use quadkey_rs::QuadKey;
use quadkey_rs::core::{geo_to_pixel, map_size, pixel_to_geo, quadkey_to_tile, tile_to_quadkey};
use std::collections::HashSet;

fn tile_at_level(levels: std::ops::RangeInclusive<u8>) -> impl Strategy<Value = ((u32, u32), u8)> {
    levels.prop_flat_map(|level| {
        let n = 1u32 << level;
        ((0..n, 0..n), Just(level))
    })
}

proptest! {
    #[test]
    fn test_tile_quadkey_roundtrip((tile, level) in tile_at_level(1..=23)) {
        let key = tile_to_quadkey(tile, level);
        prop_assert_eq!(key.len(), level as usize);
        prop_assert_eq!(quadkey_to_tile(&key), (tile, level));
    }

    #[test]
    fn test_geo_pixel_roundtrip(
        lat in -85.0..85.0_f64,
        lon in -180.0..180.0_f64,
        level in 1u8..=23
    ) {
        let (back_lat, back_lon) = pixel_to_geo(geo_to_pixel((lat, lon), level), level);

        // Quantization is at most half a pixel; allow one
        let pixel_degrees = 360.0 / map_size(level) as f64;
        prop_assert!(
            (back_lat - lat).abs() <= pixel_degrees,
            "Latitude roundtrip failed: {} -> {} at level {}", lat, back_lat, level
        );
        prop_assert!(
            (back_lon - lon).abs() <= pixel_degrees,
            "Longitude roundtrip failed: {} -> {} at level {}", lon, back_lon, level
        );
    }

    #[test]
    fn test_children_parent_inverse(key in "[0-3]{1,22}") {
        let qk = QuadKey::new(key).unwrap();
        let children = qk.children();
        prop_assert_eq!(children.len(), 4);

        let distinct: HashSet<_> = children.iter().collect();
        prop_assert_eq!(distinct.len(), 4);
        for child in &children {
            prop_assert_eq!(child.level(), qk.level() + 1);
            prop_assert_eq!(&child.parent().unwrap(), &qk);
            prop_assert_eq!(qk.is_descendant(child), Some(1));
        }
    }

    #[test]
    fn test_unwind_prefixes(key in "[0-3]{1,23}") {
        let qk = QuadKey::new(key.clone()).unwrap();
        let unwound = qk.unwind();
        prop_assert_eq!(unwound.len(), qk.level() as usize);
        for (i, ancestor) in unwound.iter().enumerate() {
            prop_assert_eq!(ancestor.level() as usize, key.len() - i);
            prop_assert!(key.starts_with(ancestor.key()));
        }
    }

    #[test]
    fn test_nearby_bound(key in "[0-3]{1,23}") {
        let qk = QuadKey::new(key).unwrap();
        let neighbors = qk.nearby();
        prop_assert!(!neighbors.is_empty());
        prop_assert!(neighbors.len() <= 8);
        for neighbor in &neighbors {
            prop_assert_eq!(neighbor.level(), qk.level());
            prop_assert_ne!(neighbor, &qk);
        }
    }

    #[test]
    fn test_difference_covers_rectangle(
        (a, b, level) in (1u8..=6).prop_flat_map(|level| {
            let n = 1u32 << level;
            ((0..n, 0..n), (0..n, 0..n), Just(level))
        })
    ) {
        let first = QuadKey::from_tile(a, level);
        let second = QuadKey::from_tile(b, level);
        let walk = first.difference_iter(&second);

        let expected_len = (a.0.abs_diff(b.0) as usize + 1) * (a.1.abs_diff(b.1) as usize + 1);
        prop_assert_eq!(walk.len(), expected_len);

        let tiles: Vec<_> = walk.map(|k| k.to_tile().0).collect();
        prop_assert_eq!(tiles.len(), expected_len);

        let expected: HashSet<_> = (a.0.min(b.0)..=a.0.max(b.0))
            .flat_map(|x| (a.1.min(b.1)..=a.1.max(b.1)).map(move |y| (x, y)))
            .collect();
        let got: HashSet<_> = tiles.into_iter().collect();
        prop_assert_eq!(got, expected);
    }
}
