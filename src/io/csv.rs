use crate::core::tile_system::valid_level;
use crate::error::QuadKeyError;
use crate::geom::{GeometryFormat, format_polygon, parse_geometry};
use crate::quadkey::{Difference, QuadKey};
use csv::StringRecord;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

enum SourceIndices {
    Geometry(usize),
    Coordinates { lat_idx: usize, lon_idx: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateSource {
    /// A single column holding WKT or GeoJSON geometry in WGS84
    GeometryColumn(String),
    /// Separate latitude and longitude columns in degrees
    CoordinateColumns {
        lat_column: String,
        lon_column: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvQuadKeyConfig {
    pub source: CoordinateSource,
    pub exclude_columns: Vec<String>,
    pub level: u8,
    pub include_tile_geometry: Option<GeometryFormat>,
}

impl CsvQuadKeyConfig {
    /// Create config for a CSV with a geometry column (WKT or GeoJSON).
    ///
    /// Each row is expanded to every tile covering the geometry's bounding box.
    ///
    /// # Example
    /// ```
    /// use quadkey_rs::CsvQuadKeyConfig;
    ///
    /// let config = CsvQuadKeyConfig::new("geometry", 12);
    /// ```
    pub fn new(geometry_column: impl Into<String>, level: u8) -> Self {
        Self {
            source: CoordinateSource::GeometryColumn(geometry_column.into()),
            exclude_columns: Vec::new(),
            level,
            include_tile_geometry: None,
        }
    }

    /// Create config for a CSV with separate latitude/longitude columns.
    ///
    /// # Example
    /// ```
    /// use quadkey_rs::CsvQuadKeyConfig;
    ///
    /// let config = CsvQuadKeyConfig::from_coords("Latitude", "Longitude", 16);
    /// ```
    pub fn from_coords(
        lat_column: impl Into<String>,
        lon_column: impl Into<String>,
        level: u8,
    ) -> Self {
        Self {
            source: CoordinateSource::CoordinateColumns {
                lat_column: lat_column.into(),
                lon_column: lon_column.into(),
            },
            exclude_columns: Vec::new(),
            level,
            include_tile_geometry: None,
        }
    }

    pub fn exclude(mut self, columns: Vec<String>) -> Self {
        self.exclude_columns = columns;
        self
    }

    /// Add a `tile_geometry` column with each tile's footprint.
    pub fn with_tile_geometry(mut self, format: GeometryFormat) -> Self {
        self.include_tile_geometry = Some(format);
        self
    }
}

pub trait CsvToQuadKey {
    fn to_quadkey_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvQuadKeyConfig,
    ) -> Result<(), QuadKeyError>;
}

impl<P: AsRef<Path>> CsvToQuadKey for P {
    fn to_quadkey_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvQuadKeyConfig,
    ) -> Result<(), QuadKeyError> {
        csv_to_quadkey_csv(self, output_path, config)
    }
}

fn column_index(headers: &StringRecord, name: &str, label: &str) -> Result<usize, QuadKeyError> {
    if name.is_empty() {
        return Err(QuadKeyError::CsvError(format!(
            "{} column name cannot be empty",
            label
        )));
    }
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| QuadKeyError::CsvError(format!("{} column '{}' not found", label, name)))
}

fn field<'r>(record: &'r StringRecord, idx: usize, label: &str) -> Result<&'r str, QuadKeyError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| QuadKeyError::CsvError(format!("Missing {} column at index {}", label, idx)))
}

fn parse_degrees(value: &str, label: &str) -> Result<f64, QuadKeyError> {
    value
        .parse()
        .map_err(|_| QuadKeyError::CsvError(format!("Invalid {}: '{}'", label, value)))
}

/// Lazy walk over the quadkeys of one row; a point is a one-tile walk.
fn row_quadkeys(
    record: &StringRecord,
    source: &SourceIndices,
    level: u8,
) -> Result<Option<Difference>, QuadKeyError> {
    match source {
        SourceIndices::Geometry(idx) => {
            let geometry = parse_geometry(field(record, *idx, "geometry")?)?;
            QuadKey::from_geometry_iter(&geometry, level)
        }
        SourceIndices::Coordinates { lat_idx, lon_idx } => {
            let lat = parse_degrees(field(record, *lat_idx, "latitude")?, "latitude")?;
            let lon = parse_degrees(field(record, *lon_idx, "longitude")?, "longitude")?;
            let key = QuadKey::from_geo(&(lat, lon), level)?;
            Ok(Some(key.difference_iter(&key)))
        }
    }
}

/// Converts a CSV with geometry or coordinate columns to a CSV keyed by quadkey.
///
/// The output starts with a `quadkey` column, then `tile_geometry` if
/// requested, then every input column except the source columns and the
/// excluded ones. Rows are streamed, so large files are never held in memory.
///
/// # Example
///
/// ```no_run
/// use quadkey_rs::{csv_to_quadkey_csv, CsvQuadKeyConfig, GeometryFormat};
///
/// let config = CsvQuadKeyConfig::from_coords("lat", "lon", 16)
///     .exclude(vec!["notes".into()])
///     .with_tile_geometry(GeometryFormat::Wkt);
///
/// csv_to_quadkey_csv("stops.csv", "stops_quadkeys.csv", &config).unwrap();
/// ```
pub fn csv_to_quadkey_csv(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CsvQuadKeyConfig,
) -> Result<(), QuadKeyError> {
    if !valid_level(config.level) {
        return Err(QuadKeyError::InvalidLevel(config.level));
    }

    let file = File::open(csv_path).map_err(|e| QuadKeyError::IoError(e.to_string()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| QuadKeyError::CsvError(e.to_string()))?
        .clone();

    // Source columns never reach the output
    let (source_indices, mut exclude_indices) = match &config.source {
        CoordinateSource::GeometryColumn(col) => {
            let idx = column_index(&headers, col, "Geometry")?;
            (SourceIndices::Geometry(idx), HashSet::from([idx]))
        }
        CoordinateSource::CoordinateColumns {
            lat_column,
            lon_column,
        } => {
            let lat_idx = column_index(&headers, lat_column, "Latitude")?;
            let lon_idx = column_index(&headers, lon_column, "Longitude")?;
            (
                SourceIndices::Coordinates { lat_idx, lon_idx },
                HashSet::from([lat_idx, lon_idx]),
            )
        }
    };

    for col_name in &config.exclude_columns {
        if let Some(idx) = headers.iter().position(|h| h == col_name) {
            exclude_indices.insert(idx);
        }
    }

    let out_file = File::create(output_path).map_err(|e| QuadKeyError::IoError(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(out_file);

    let mut header_row: Vec<&str> = vec!["quadkey"];
    if config.include_tile_geometry.is_some() {
        header_row.push("tile_geometry");
    }
    for (i, h) in headers.iter().enumerate() {
        if !exclude_indices.contains(&i) {
            header_row.push(h);
        }
    }
    writer
        .write_record(&header_row)
        .map_err(|e| QuadKeyError::CsvError(e.to_string()))?;

    let mut rows_in = 0usize;
    let mut rows_out = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| QuadKeyError::CsvError(e.to_string()))?;
        rows_in += 1;

        let Some(keys) = row_quadkeys(&record, &source_indices, config.level)? else {
            continue;
        };
        log::trace!("Row {} maps to {} quadkeys", rows_in, keys.remaining());

        for key in keys {
            let mut row: Vec<String> = vec![key.to_string()];

            if let Some(format) = config.include_tile_geometry {
                row.push(format_polygon(&key.to_polygon(), format));
            }

            for (i, value) in record.iter().enumerate() {
                if !exclude_indices.contains(&i) {
                    row.push(value.to_string());
                }
            }
            writer
                .write_record(&row)
                .map_err(|e| QuadKeyError::CsvError(e.to_string()))?;
            rows_out += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| QuadKeyError::IoError(e.to_string()))?;

    log::debug!(
        "Indexed {} CSV rows into {} quadkey rows at level {}",
        rows_in,
        rows_out,
        config.level
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{TempDir, tempdir};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_input(lines: &[&str]) -> Result<(TempDir, std::path::PathBuf), QuadKeyError> {
        let dir = tempdir().map_err(|e| QuadKeyError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("input.csv");
        let mut file = File::create(&csv_path).map_err(|e| QuadKeyError::IoError(e.to_string()))?;
        for line in lines {
            writeln!(file, "{}", line).map_err(|e| QuadKeyError::IoError(e.to_string()))?;
        }
        Ok((dir, csv_path))
    }

    fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, QuadKeyError> {
        let mut reader =
            csv::Reader::from_path(path).map_err(|e| QuadKeyError::CsvError(e.to_string()))?;
        let mut rows = vec![
            reader
                .headers()
                .map_err(|e| QuadKeyError::CsvError(e.to_string()))?
                .iter()
                .map(String::from)
                .collect(),
        ];
        for record in reader.records() {
            let record = record.map_err(|e| QuadKeyError::CsvError(e.to_string()))?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(rows)
    }

    #[test]
    fn test_from_coords() -> Result<(), QuadKeyError> {
        init_logging();
        let (dir, csv_path) = write_input(&[
            "StopCode,Name,Latitude,Longitude",
            "ABC123,Temple Meads,51.44827,-2.58302",
            "DEF456,Equator,0.0,0.0",
        ])?;
        let output_path = dir.path().join("output.csv");

        let config = CsvQuadKeyConfig::from_coords("Latitude", "Longitude", 4);
        csv_to_quadkey_csv(&csv_path, &output_path, &config)?;

        let rows = read_rows(&output_path)?;
        assert_eq!(rows[0], vec!["quadkey", "StopCode", "Name"]);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1][0],
            QuadKey::from_geo(&(51.44827, -2.58302), 4)?.to_string()
        );
        assert_eq!(rows[2], vec!["3000", "DEF456", "Equator"]);
        Ok(())
    }

    #[test]
    fn test_geometry_column_with_tile_geometry() -> Result<(), QuadKeyError> {
        init_logging();
        let (dir, csv_path) = write_input(&[
            "ASSET_ID,TYPE,geometry",
            "CDT123,Pipe,\"{\"\"type\"\":\"\"Point\"\",\"\"coordinates\"\":[-0.1,51.5]}\"",
            "CDT124,Main,\"LINESTRING(-3.0 50.0, 2.0 53.0)\"",
        ])?;
        let output_path = dir.path().join("output.csv");

        let config = CsvQuadKeyConfig::new("geometry", 8).with_tile_geometry(GeometryFormat::Wkt);
        convert_via_trait(&csv_path, &output_path, &config)?;

        let rows = read_rows(&output_path)?;
        assert_eq!(rows[0], vec!["quadkey", "tile_geometry", "ASSET_ID", "TYPE"]);

        let line_rows = rows.iter().filter(|r| r[2] == "CDT124").count();
        assert!(line_rows > 1);
        assert_eq!(rows.iter().filter(|r| r[2] == "CDT123").count(), 1);
        assert!(rows[1..].iter().all(|r| r[1].starts_with("POLYGON")));
        Ok(())
    }

    fn convert_via_trait(
        input: &Path,
        output: &Path,
        config: &CsvQuadKeyConfig,
    ) -> Result<(), QuadKeyError> {
        input.to_quadkey_csv(output, config)
    }

    #[test]
    fn test_geometry_rows_stream_one_row_per_tile() -> Result<(), QuadKeyError> {
        let (dir, csv_path) = write_input(&[
            "id,geometry",
            "empty,GEOMETRYCOLLECTION EMPTY",
            "line,\"LINESTRING(-3.0 50.0, 2.0 53.0)\"",
        ])?;
        let output_path = dir.path().join("output.csv");

        let config = CsvQuadKeyConfig::new("geometry", 8);
        csv_to_quadkey_csv(&csv_path, &output_path, &config)?;

        let rows = read_rows(&output_path)?;
        let geometry = parse_geometry("LINESTRING(-3.0 50.0, 2.0 53.0)")?;
        let expected: Vec<String> = QuadKey::from_geometry(&geometry, 8)?
            .iter()
            .map(QuadKey::to_string)
            .collect();

        assert!(rows[1..].iter().all(|r| r[1] == "line"));
        let written: Vec<String> = rows[1..].iter().map(|r| r[0].clone()).collect();
        assert_eq!(written, expected);
        Ok(())
    }

    #[test]
    fn test_exclude_columns() -> Result<(), QuadKeyError> {
        let (dir, csv_path) = write_input(&["id,lat,lon,notes", "1,10.0,20.0,drop me"])?;
        let output_path = dir.path().join("output.csv");

        let config =
            CsvQuadKeyConfig::from_coords("lat", "lon", 8).exclude(vec!["notes".to_string()]);
        csv_to_quadkey_csv(&csv_path, &output_path, &config)?;

        let rows = read_rows(&output_path)?;
        assert_eq!(rows[0], vec!["quadkey", "id"]);
        assert_eq!(rows[1][1], "1");
        Ok(())
    }

    #[test]
    fn test_missing_column() -> Result<(), QuadKeyError> {
        let (dir, csv_path) = write_input(&["id,lat,lon", "1,10.0,20.0"])?;
        let output_path = dir.path().join("output.csv");

        let config = CsvQuadKeyConfig::from_coords("Latitude", "lon", 8);
        let result = csv_to_quadkey_csv(&csv_path, &output_path, &config);
        assert!(matches!(result, Err(QuadKeyError::CsvError(msg)) if msg.contains("Latitude")));
        Ok(())
    }

    #[test]
    fn test_invalid_level() -> Result<(), QuadKeyError> {
        let (dir, csv_path) = write_input(&["id,lat,lon", "1,10.0,20.0"])?;
        let output_path = dir.path().join("output.csv");

        for level in [0, 24] {
            let config = CsvQuadKeyConfig::from_coords("lat", "lon", level);
            let result = csv_to_quadkey_csv(&csv_path, &output_path, &config);
            assert_eq!(result, Err(QuadKeyError::InvalidLevel(level)));
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_coordinate() -> Result<(), QuadKeyError> {
        let (dir, csv_path) = write_input(&["id,lat,lon", "1,95.0,20.0"])?;
        let output_path = dir.path().join("output.csv");

        let config = CsvQuadKeyConfig::from_coords("lat", "lon", 8);
        let result = csv_to_quadkey_csv(&csv_path, &output_path, &config);
        assert_eq!(
            result,
            Err(QuadKeyError::InvalidCoordinate { lat: 95.0, lon: 20.0 })
        );
        Ok(())
    }

    #[test]
    fn test_unparseable_coordinate() -> Result<(), QuadKeyError> {
        let (dir, csv_path) = write_input(&["id,lat,lon", "1,north,20.0"])?;
        let output_path = dir.path().join("output.csv");

        let config = CsvQuadKeyConfig::from_coords("lat", "lon", 8);
        let result = csv_to_quadkey_csv(&csv_path, &output_path, &config);
        assert!(matches!(result, Err(QuadKeyError::CsvError(msg)) if msg.contains("north")));
        Ok(())
    }
}
