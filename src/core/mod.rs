pub mod constants;
pub mod tile_system;

pub use constants::{
    EARTH_RADIUS, MAX_LATITUDE, MAX_LEVEL, MAX_LONGITUDE, MIN_LATITUDE, MIN_LEVEL, MIN_LONGITUDE,
    TILE_SIZE,
};
pub use tile_system::{
    clip, geo_to_pixel, ground_resolution, map_size, pixel_to_geo, pixel_to_tile,
    quadkey_to_tile, tile_bounds, tile_to_pixel, tile_to_quadkey, valid_geo, valid_key,
    valid_level,
};
