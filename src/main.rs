use quadkey_rs::{QuadKey, QuadKeyError};

fn main() -> Result<(), QuadKeyError> {
    let lat = 53.48082746395233;
    let lon = -2.2479699500757597;

    let qk = QuadKey::from_geo(&(lat, lon), 12)?;
    let (tile, level) = qk.to_tile();

    println!("QuadKey: {}", qk);
    println!("Tile: ({}, {}) at level {}", tile.0, tile.1, level);
    println!("Corner: {:?}", qk.to_record(false));
    println!("Center: {:?}", qk.to_record(true));
    println!("Side: {:.1} m, area: {:.1} m^2", qk.side(), qk.area());
    println!("Parent: {}", qk.parent()?);

    let neighbors: Vec<String> = qk.nearby().iter().map(QuadKey::to_string).collect();
    println!("Nearby: {}", neighbors.join(", "));

    Ok(())
}
