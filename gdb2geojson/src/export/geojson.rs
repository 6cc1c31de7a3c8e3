//! Écriture d'une couche en FeatureCollection GeoJSON
//!
//! Le document garde l'ordre `type`, `name`, `crs`, `features`; les
//! properties gardent l'ordre des champs de la couche source.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filegdb::LayerData;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};

/// CRS annoncé dans chaque document (WGS84 lon/lat)
pub const CRS84_URN: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

/// Extension des fichiers produits
pub const EXTENSION: &str = "geojson";

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    crs: NamedCrs,
    features: Vec<FeatureRef<'a>>,
}

#[derive(Serialize)]
struct NamedCrs {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: CrsProperties,
}

#[derive(Serialize)]
struct CrsProperties {
    name: &'static str,
}

#[derive(Serialize)]
struct FeatureRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Option<&'a geojson::Geometry>,
    properties: &'a Map<String, Value>,
}

impl<'a> Document<'a> {
    fn from_layer(layer: &'a LayerData) -> Self {
        Self {
            kind: "FeatureCollection",
            name: &layer.name,
            crs: NamedCrs {
                kind: "name",
                properties: CrsProperties { name: CRS84_URN },
            },
            features: layer
                .features
                .iter()
                .map(|f| FeatureRef {
                    kind: "Feature",
                    geometry: f.geometry.as_ref(),
                    properties: &f.properties,
                })
                .collect(),
        }
    }
}

/// Chemin de sortie d'une couche: `<dir>/<layer>.geojson`
pub fn layer_output_path(dir: &Path, layer: &str) -> PathBuf {
    dir.join(format!("{}.{}", layer, EXTENSION))
}

/// Sérialise une couche (UTF-8, indenté, caractères non ASCII non échappés)
pub fn write_layer<W: Write>(writer: W, layer: &LayerData, indent: usize) -> Result<()> {
    let indent = b" ".repeat(indent);
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(&indent));
    Document::from_layer(layer)
        .serialize(&mut serializer)
        .context(format!("Failed to serialize layer '{}'", layer.name))
}

/// Exporte une couche vers un fichier GeoJSON (écrase le fichier existant)
pub fn export_to_geojson(layer: &LayerData, output_path: &Path, indent: usize) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_layer(&mut writer, layer, indent)?;
    writer.flush()?;

    Ok(())
}
