//! Configuration de l'outil
//!
//! Ordre de priorité (du plus faible au plus fort): valeurs par défaut,
//! fichier JSON (`--config`), variables d'environnement, options CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filegdb::{BackendPreference, OgrTools};
use serde::{Deserialize, Serialize};

/// Dossier de sortie par défaut
pub const DEFAULT_OUTPUT: &str = "./geojson";

/// Préfixe des variables d'environnement
const ENV_PREFIX: &str = "GDB2GEOJSON_";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Dossier de sortie des fichiers GeoJSON
    pub output: PathBuf,

    /// Backend: auto, gdal ou ogr
    pub backend: String,

    /// Exécutable ogrinfo (backend de repli)
    pub ogrinfo: String,

    /// Exécutable ogr2ogr (backend de repli)
    pub ogr2ogr: String,

    /// Indentation du JSON écrit
    pub indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        let tools = OgrTools::default();
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            backend: BackendPreference::Auto.to_string(),
            ogrinfo: tools.ogrinfo,
            ogr2ogr: tools.ogr2ogr,
            indent: 2,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Applique les variables d'environnement `GDB2GEOJSON_*`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(&format!("{}{}", ENV_PREFIX, name));

        if let Some(output) = get("OUTPUT") {
            self.output = PathBuf::from(output);
        }
        if let Some(backend) = get("BACKEND") {
            self.backend = backend;
        }
        if let Some(ogrinfo) = get("OGRINFO") {
            self.ogrinfo = ogrinfo;
        }
        if let Some(ogr2ogr) = get("OGR2OGR") {
            self.ogr2ogr = ogr2ogr;
        }
        if let Some(indent) = get("INDENT") {
            self.indent = indent
                .trim()
                .parse()
                .context(format!("Invalid {}INDENT: {}", ENV_PREFIX, indent))?;
        }

        Ok(())
    }

    /// Préférence de backend validée
    pub fn backend_preference(&self) -> Result<BackendPreference> {
        self.backend.parse().map_err(anyhow::Error::msg)
    }

    /// Chemins des outils GDAL pour le backend de repli
    pub fn ogr_tools(&self) -> OgrTools {
        OgrTools {
            ogrinfo: self.ogrinfo.clone(),
            ogr2ogr: self.ogr2ogr.clone(),
        }
    }
}
