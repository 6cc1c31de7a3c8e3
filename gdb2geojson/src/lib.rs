//! # gdb2geojson
//!
//! Conversion des feature classes d'une géodatabase fichier ArcGIS (`.gdb`)
//! en fichiers GeoJSON WGS84, un fichier par couche.
//!
//! ## Features
//!
//! - Reprojection en WGS84 (lon/lat) quel que soit le système source
//! - Ordre et types des champs conservés
//! - Conversion par lot tolérante aux couches en erreur
//! - Rapport JSON optionnel
//!
//! ## Usage CLI
//!
//! ```bash
//! # Lister les couches
//! gdb2geojson --input ./Semarang.gdb --list
//!
//! # Convertir toutes les couches
//! gdb2geojson --input ./Semarang.gdb --output ./geojson/
//!
//! # Convertir une seule couche
//! gdb2geojson -i ./Semarang.gdb -o ./geojson/ -l KiosRejomulyo
//! ```

pub mod config;
pub mod convert;
pub mod export;
pub mod report;

pub use config::Config;
pub use convert::{convert_all, convert_layer, list_layers, ConvertOptions, LayerSummary, Progress};
pub use report::{ConversionReport, ConversionStatus, LayerReport};
