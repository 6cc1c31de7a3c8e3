//! # filegdb
//!
//! Lecture des feature classes d'une géodatabase fichier ArcGIS (`.gdb`),
//! reprojetées en WGS84 et exposées sous forme de features GeoJSON.
//!
//! ## Features
//!
//! - Backend GDAL (feature cargo `gdal`, nécessite libgdal)
//! - Backend de repli via les outils `ogrinfo` / `ogr2ogr`
//! - Détection unique du backend au démarrage ([`BackendSelection`])
//! - Ordre des champs conservé dans les properties
//!
//! ## Usage
//!
//! ```rust,ignore
//! use filegdb::{BackendPreference, BackendSelection, OgrTools};
//! use std::path::Path;
//!
//! let selection = BackendSelection::detect(BackendPreference::Auto, &OgrTools::default());
//! let backend = selection.backend().ok_or_else(filegdb::unavailable)?;
//!
//! for name in backend.list_layers(Path::new("city.gdb"))? {
//!     let layer = backend.read_layer(Path::new("city.gdb"), &name)?;
//!     println!("{}: {} features", layer.name, layer.len());
//! }
//! ```

pub mod backend;
pub mod error;
pub mod types;

pub use backend::ogr::{OgrCliBackend, OgrTools};
pub use backend::{Backend, BackendPreference, BackendSelection};
pub use error::FilegdbError;
pub use types::{Feature, LayerData, WGS84_EPSG};

#[cfg(feature = "gdal")]
pub use backend::gdal::GdalBackend;

use std::path::Path;

/// Résultat spécialisé du crate
pub type Result<T> = std::result::Result<T, FilegdbError>;

/// Message d'installation affiché quand aucun backend n'est disponible
pub const INSTALL_HINT: &str = "Install one of: \
    (A) libgdal and rebuild with `--features gdal` (full support); \
    (B) the GDAL command-line tools providing ogrinfo/ogr2ogr \
    (`apt install gdal-bin`, `brew install gdal` or `conda install -c conda-forge gdal`).";

/// Erreur `BackendUnavailable` avec le message d'installation
pub fn unavailable() -> FilegdbError {
    FilegdbError::BackendUnavailable(INSTALL_HINT.to_string())
}

/// Vérifie que le conteneur existe sur le disque (fichier ou dossier)
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(FilegdbError::NotFound(path.to_path_buf()))
    }
}
