//! Backends d'accès au conteneur et sélection au démarrage
//!
//! Deux implémentations interchangeables de [`Backend`]:
//! - `gdal`: liaison directe à libgdal (feature cargo `gdal`)
//! - `ogr`: appel des outils `ogrinfo` / `ogr2ogr`
//!
//! La détection est faite une seule fois ([`BackendSelection::detect`]) et le
//! résultat typé est passé au reste de l'exécution.

#[cfg(feature = "gdal")]
pub mod gdal;
pub mod ogr;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::types::LayerData;
use crate::Result;

use self::ogr::{OgrCliBackend, OgrTools};

/// Capacités attendues d'un backend géospatial
pub trait Backend {
    /// Nom court du backend (pour les logs et le rapport)
    fn name(&self) -> &'static str;

    /// Liste les couches dans l'ordre natif du conteneur
    fn list_layers(&self, path: &Path) -> Result<Vec<String>>;

    /// Lit une couche complète, géométries reprojetées en WGS84 lon/lat
    fn read_layer(&self, path: &Path, layer: &str) -> Result<LayerData>;
}

/// Backend demandé par l'utilisateur
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// GDAL si disponible, sinon ogr2ogr
    #[default]
    Auto,
    /// GDAL uniquement
    Gdal,
    /// ogrinfo / ogr2ogr uniquement
    Ogr,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "gdal" => Ok(Self::Gdal),
            "ogr" | "ogr2ogr" => Ok(Self::Ogr),
            other => Err(format!("Unknown backend: {}. Use: auto, gdal, ogr", other)),
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Gdal => "gdal",
            Self::Ogr => "ogr",
        };
        f.write_str(name)
    }
}

/// Résultat de la détection des backends
pub enum BackendSelection {
    #[cfg(feature = "gdal")]
    Gdal(self::gdal::GdalBackend),
    Fallback(OgrCliBackend),
    None,
}

impl BackendSelection {
    /// Détecte le backend à utiliser selon la préférence
    pub fn detect(preference: BackendPreference, tools: &OgrTools) -> Self {
        if matches!(preference, BackendPreference::Auto | BackendPreference::Gdal) {
            if let Some(selection) = detect_gdal() {
                return selection;
            }
        }

        if matches!(preference, BackendPreference::Auto | BackendPreference::Ogr) {
            let fallback = OgrCliBackend::new(tools.clone());
            if fallback.is_available() {
                debug!(ogrinfo = %tools.ogrinfo, ogr2ogr = %tools.ogr2ogr, "Using ogr2ogr backend");
                return Self::Fallback(fallback);
            }
            debug!(ogrinfo = %tools.ogrinfo, "GDAL command-line tools not found");
        }

        Self::None
    }

    /// Backend sélectionné, `None` si aucun n'est disponible
    pub fn backend(&self) -> Option<&dyn Backend> {
        match self {
            #[cfg(feature = "gdal")]
            Self::Gdal(backend) => Some(backend),
            Self::Fallback(backend) => Some(backend),
            Self::None => None,
        }
    }

    /// Nom du backend retenu ("none" si aucun)
    pub fn label(&self) -> &'static str {
        self.backend().map_or("none", |b| b.name())
    }
}

#[cfg(feature = "gdal")]
fn detect_gdal() -> Option<BackendSelection> {
    if self::gdal::GdalBackend::is_available() {
        debug!("Using GDAL backend");
        Some(BackendSelection::Gdal(self::gdal::GdalBackend::new()))
    } else {
        debug!("GDAL linked but OpenFileGDB driver missing");
        None
    }
}

#[cfg(not(feature = "gdal"))]
fn detect_gdal() -> Option<BackendSelection> {
    debug!("Built without the 'gdal' feature");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_tools() -> OgrTools {
        OgrTools {
            ogrinfo: "/nonexistent/bin/ogrinfo".to_string(),
            ogr2ogr: "/nonexistent/bin/ogr2ogr".to_string(),
        }
    }

    #[test]
    fn test_preference_from_str() {
        assert_eq!("auto".parse(), Ok(BackendPreference::Auto));
        assert_eq!("GDAL".parse(), Ok(BackendPreference::Gdal));
        assert_eq!("ogr2ogr".parse(), Ok(BackendPreference::Ogr));
        assert_eq!(" ogr ".parse(), Ok(BackendPreference::Ogr));
        assert!("geopandas".parse::<BackendPreference>().is_err());
    }

    #[test]
    fn test_preference_display_roundtrips() {
        for pref in [
            BackendPreference::Auto,
            BackendPreference::Gdal,
            BackendPreference::Ogr,
        ] {
            assert_eq!(pref.to_string().parse(), Ok(pref));
        }
    }

    #[test]
    fn test_forced_ogr_without_tools_is_none() {
        let selection = BackendSelection::detect(BackendPreference::Ogr, &missing_tools());
        assert!(selection.backend().is_none());
        assert_eq!(selection.label(), "none");
    }

    #[cfg(not(feature = "gdal"))]
    #[test]
    fn test_no_backend_without_gdal_feature_or_tools() {
        let selection = BackendSelection::detect(BackendPreference::Auto, &missing_tools());
        assert!(matches!(selection, BackendSelection::None));

        let selection = BackendSelection::detect(BackendPreference::Gdal, &missing_tools());
        assert!(matches!(selection, BackendSelection::None));
    }
}
