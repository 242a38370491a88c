//! Format-specific reading and writing.
//!
//! - `geojson` - FeatureCollections of evaluation units and point layers, and the scored output
//! - `population` - census population table (CSV)

pub mod geojson;
pub mod population;

pub use geojson::{read_geojson, write_geojson, Feature, FeatureCollection};
pub use population::{read_population_csv, PopulationRow};
