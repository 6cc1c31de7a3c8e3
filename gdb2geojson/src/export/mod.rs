//! Modules d'export (GeoJSON, contrôle d'emprise)

pub mod extent;
pub mod geojson;

pub use self::extent::{check_layer, Extent, ExtentCheck};
pub use self::geojson::{export_to_geojson, layer_output_path};
