//! Types d'erreurs pour le crate filegdb

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture d'une géodatabase
#[derive(Debug, Error)]
pub enum FilegdbError {
    /// Le chemin d'entrée n'existe pas
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Le conteneur existe mais aucun backend ne sait l'ouvrir
    #[error("Cannot open {}: {reason}", path.display())]
    OpenFailed { path: PathBuf, reason: String },

    /// Couche absente du conteneur
    #[error("Layer '{layer}' not found in {}", path.display())]
    LayerNotFound { layer: String, path: PathBuf },

    /// Aucun backend géospatial disponible
    #[error("No supported geospatial backend available. {0}")]
    BackendUnavailable(String),

    /// Feature illisible (géométrie ou champ)
    #[error("Invalid feature in layer '{layer}': {reason}")]
    InvalidFeature { layer: String, reason: String },

    /// Échec d'un outil en ligne de commande (ogrinfo, ogr2ogr)
    #[error("{tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    /// Erreur d'I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON invalide renvoyé par un backend
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Erreur remontée par GDAL
    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

impl FilegdbError {
    /// Crée une erreur d'ouverture avec contexte
    pub fn open_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de couche introuvable
    pub fn layer_not_found(layer: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::LayerNotFound {
            layer: layer.into(),
            path: path.into(),
        }
    }

    /// Crée une erreur de feature invalide
    pub fn invalid_feature(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFeature {
            layer: layer.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur d'outil externe
    pub fn tool(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_subject() {
        let err = FilegdbError::layer_not_found("Markets", "city.gdb");
        assert_eq!(err.to_string(), "Layer 'Markets' not found in city.gdb");

        let err = FilegdbError::NotFound(PathBuf::from("missing.gdb"));
        assert_eq!(err.to_string(), "File not found: missing.gdb");

        let err = FilegdbError::tool("ogr2ogr", "exit status 1");
        assert_eq!(err.to_string(), "ogr2ogr failed: exit status 1");
    }
}
