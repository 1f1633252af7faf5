pub mod csv;

pub use self::csv::{CoordinateSource, CsvQuadKeyConfig, CsvToQuadKey, csv_to_quadkey_csv};
