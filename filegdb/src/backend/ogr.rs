//! Backend de repli: outils en ligne de commande `ogrinfo` / `ogr2ogr`
//!
//! Le système source est lu avec `ogrinfo -so -json`. La reprojection est
//! confiée à `ogr2ogr -t_srs EPSG:4326`, demandée seulement si la couche
//! déclare un système autre que WGS84. Le typage des champs suit le driver
//! GeoJSON de GDAL: les dates ressortent en chaînes.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::Backend;
use crate::error::FilegdbError;
use crate::types::{Feature, LayerData, WGS84_EPSG};
use crate::Result;

/// Chemins des exécutables GDAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgrTools {
    pub ogrinfo: String,
    pub ogr2ogr: String,
}

impl Default for OgrTools {
    fn default() -> Self {
        Self {
            ogrinfo: "ogrinfo".to_string(),
            ogr2ogr: "ogr2ogr".to_string(),
        }
    }
}

/// Backend basé sur les outils GDAL installés dans le PATH
#[derive(Debug, Clone)]
pub struct OgrCliBackend {
    tools: OgrTools,
}

impl OgrCliBackend {
    pub fn new(tools: OgrTools) -> Self {
        Self { tools }
    }

    /// Vérifie que `ogrinfo --version` s'exécute correctement
    pub fn is_available(&self) -> bool {
        Command::new(&self.tools.ogrinfo)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Lance un outil et retourne sa sortie standard
    fn run<I, S>(&self, tool: &str, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(tool);
        command.args(args);
        trace!(command = ?command, "Running GDAL tool");

        let output = command
            .output()
            .map_err(|e| FilegdbError::tool(tool, e.to_string()))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(FilegdbError::tool(
                tool,
                format!("{} ({})", stderr.trim(), output.status),
            ))
        }
    }

    /// Système de coordonnées de la couche, lu avec `ogrinfo -so -json`
    ///
    /// Les `ogrinfo` antérieurs à GDAL 3.7 n'ont pas de sortie JSON: la couche
    /// est alors reprojetée sans que son système soit connu.
    fn layer_srs(&self, path: &Path, layer: &str) -> LayerSrs {
        let info = self
            .run(
                &self.tools.ogrinfo,
                [
                    OsStr::new("-ro"),
                    OsStr::new("-so"),
                    OsStr::new("-json"),
                    path.as_os_str(),
                    OsStr::new(layer),
                ],
            )
            .and_then(|stdout| parse_layer_srs(&stdout));

        match info {
            Ok(srs) => srs,
            Err(e) => {
                warn!(layer, error = %e, "Cannot read layer coordinate system");
                LayerSrs::Unknown
            }
        }
    }
}

/// Système de coordonnées d'une couche tel que décrit par `ogrinfo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSrs {
    /// Aucun système déclaré: coordonnées écrites telles quelles
    Missing,
    /// Déjà en WGS84 (`EPSG:4326` ou `OGC:CRS84`)
    Wgs84(String),
    /// Autre système, identifiant `AUTORITÉ:CODE` ou nom si connu
    Other(Option<String>),
    /// Description illisible
    Unknown,
}

impl LayerSrs {
    /// Vrai si `ogr2ogr` doit recevoir `-t_srs`
    pub fn needs_transform(&self) -> bool {
        matches!(self, Self::Other(_) | Self::Unknown)
    }

    pub fn identifier(&self) -> Option<String> {
        match self {
            Self::Wgs84(id) => Some(id.clone()),
            Self::Other(id) => id.clone(),
            Self::Missing | Self::Unknown => None,
        }
    }
}

impl Backend for OgrCliBackend {
    fn name(&self) -> &'static str {
        "ogr2ogr"
    }

    fn list_layers(&self, path: &Path) -> Result<Vec<String>> {
        let stdout = self
            .run(
                &self.tools.ogrinfo,
                [OsStr::new("-ro"), OsStr::new("-q"), path.as_os_str()],
            )
            .map_err(|e| FilegdbError::open_failed(path, e.to_string()))?;

        let layers = parse_layer_listing(&String::from_utf8_lossy(&stdout));
        debug!(path = %path.display(), count = layers.len(), "Listed layers");
        Ok(layers)
    }

    fn read_layer(&self, path: &Path, layer: &str) -> Result<LayerData> {
        if !self.list_layers(path)?.iter().any(|name| name == layer) {
            return Err(FilegdbError::layer_not_found(layer, path));
        }

        let srs = self.layer_srs(path, layer);
        debug!(layer, srs = ?srs, reproject = srs.needs_transform(), "Reading layer");

        let target = format!("EPSG:{}", WGS84_EPSG);
        let mut args = vec![OsStr::new("-f"), OsStr::new("GeoJSON")];
        if srs.needs_transform() {
            args.extend([OsStr::new("-t_srs"), OsStr::new(&target)]);
        }
        args.extend([OsStr::new("/vsistdout/"), path.as_os_str(), OsStr::new(layer)]);

        let stdout = self.run(&self.tools.ogr2ogr, args)?;
        layer_from_geojson(layer, &srs, &stdout)
    }
}

/// Noms de types géométriques affichés par `ogrinfo`
const GEOMETRY_TYPES: &str = "Point|Line String|Polygon|Multi Point|Multi Line String|\
    Multi Polygon|Geometry Collection|Circular String|Compound Curve|Curve Polygon|\
    Multi Curve|Multi Surface|Curve|Surface|Polyhedral Surface|TIN|Triangle|None|\
    Unknown \\(any\\)";

/// Extrait les noms de couches de la sortie `ogrinfo -q`
///
/// Format des lignes: `1: Markets (Point)`, `2: Roads (Multi Line String)`,
/// `3: Parcels (Point, Polygon)` ou `4: Lookup` pour une table sans géométrie.
/// Seule une parenthèse contenant des types géométriques est retirée du nom.
pub fn parse_layer_listing(output: &str) -> Vec<String> {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let line = LINE.get_or_init(|| {
        let kind = format!("(?:3D )?(?:Measured )?(?:{})", GEOMETRY_TYPES);
        let pattern = format!(r"^\s*\d+:\s+(.+?)(?:\s+\({kind}(?:,\s*{kind})*\))?\s*$");
        Regex::new(&pattern).expect("valid layer listing regex")
    });

    output
        .lines()
        .filter_map(|l| line.captures(l))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Lit le système du premier champ géométrique dans la sortie `ogrinfo -json`
pub fn parse_layer_srs(bytes: &[u8]) -> Result<LayerSrs> {
    let info: Value = serde_json::from_slice(bytes)?;

    let crs = info
        .pointer("/layers/0/geometryFields")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find_map(|field| field.get("coordinateSystem").filter(|crs| !crs.is_null()));

    let Some(crs) = crs else {
        return Ok(LayerSrs::Missing);
    };

    let projjson = crs.get("projjson");
    let id = projjson.and_then(|p| p.get("id")).and_then(authority_code);

    Ok(match id {
        Some(id) if is_wgs84(&id) => LayerSrs::Wgs84(id),
        Some(id) => LayerSrs::Other(Some(id)),
        None => LayerSrs::Other(
            projjson
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
    })
}

fn is_wgs84(id: &str) -> bool {
    id == "OGC:CRS84" || id == format!("EPSG:{}", WGS84_EPSG)
}

/// `{"authority": "EPSG", "code": 32749}` -> `EPSG:32749`
fn authority_code(id: &Value) -> Option<String> {
    let authority = id.get("authority")?.as_str()?;
    let code = match id.get("code")? {
        Value::String(code) => code.clone(),
        code => code.to_string(),
    };
    Some(format!("{}:{}", authority, code))
}

/// Convertit la FeatureCollection produite par ogr2ogr en [`LayerData`]
pub fn layer_from_geojson(layer: &str, srs: &LayerSrs, bytes: &[u8]) -> Result<LayerData> {
    let collection: geojson::FeatureCollection = serde_json::from_slice(bytes)
        .map_err(|e| FilegdbError::invalid_feature(layer, e.to_string()))?;

    let features = collection
        .features
        .into_iter()
        .map(|f| Feature {
            geometry: f.geometry,
            properties: f.properties.unwrap_or_default(),
        })
        .collect();

    Ok(LayerData {
        name: layer.to_string(),
        source_crs: srs.identifier(),
        reprojected: srs.needs_transform(),
        features,
    })
}
