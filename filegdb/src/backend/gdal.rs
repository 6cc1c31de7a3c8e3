//! Backend GDAL/OGR (feature `gdal`)
//!
//! Le dataset, la couche et la transformation de coordonnées vivent le temps
//! d'un appel à [`Backend::read_layer`] et sont libérés avant la couche suivante.

use std::path::Path;

use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::vector::{FieldValue, LayerAccess};
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags};
use serde_json::{Map, Value};
use tracing::debug;

use super::Backend;
use crate::error::FilegdbError;
use crate::types::{Feature, LayerData};
use crate::Result;

/// Définition du système cible: WGS84 en ordre lon/lat
const TARGET_CRS: &str = "OGC:CRS84";

/// Backend lié à libgdal
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalBackend;

impl GdalBackend {
    pub fn new() -> Self {
        Self
    }

    /// Vrai si le driver OpenFileGDB est enregistré
    pub fn is_available() -> bool {
        DriverManager::register_all();
        DriverManager::get_driver_by_name("OpenFileGDB").is_ok()
    }
}

impl Backend for GdalBackend {
    fn name(&self) -> &'static str {
        "gdal"
    }

    fn list_layers(&self, path: &Path) -> Result<Vec<String>> {
        let dataset = open_dataset(path)?;
        Ok(dataset.layers().map(|layer| layer.name()).collect())
    }

    fn read_layer(&self, path: &Path, name: &str) -> Result<LayerData> {
        let dataset = open_dataset(path)?;
        let mut layer = dataset
            .layer_by_name(name)
            .map_err(|_| FilegdbError::layer_not_found(name, path))?;

        // Une seule transformation par couche, réutilisée pour chaque feature
        let target = SpatialRef::from_definition(TARGET_CRS)?;
        let source = layer.spatial_ref();
        let transform = match &source {
            Some(srs) if *srs != target => Some(CoordTransform::new(srs, &target)?),
            _ => None,
        };
        let source_crs = source.as_ref().and_then(|srs| srs.authority().ok());

        debug!(
            layer = name,
            source_crs = ?source_crs,
            reproject = transform.is_some(),
            "Reading layer"
        );

        let mut features = Vec::new();
        for feature in layer.features() {
            let geometry = match feature.geometry() {
                Some(geom) => {
                    let json = match &transform {
                        Some(ct) => geom.transform(ct)?.json()?,
                        None => geom.json()?,
                    };
                    let geometry = serde_json::from_str::<geojson::Geometry>(&json)
                        .map_err(|e| FilegdbError::invalid_feature(name, e.to_string()))?;
                    Some(geometry)
                }
                None => None,
            };

            let properties: Map<String, Value> = feature
                .fields()
                .map(|(field, value)| (field, field_to_json(value)))
                .collect();

            features.push(Feature {
                geometry,
                properties,
            });
        }

        Ok(LayerData {
            name: name.to_string(),
            source_crs,
            reprojected: transform.is_some(),
            features,
        })
    }
}

/// Ouvre le conteneur en lecture seule, mode vecteur
fn open_dataset(path: &Path) -> Result<Dataset> {
    let options = DatasetOptions {
        open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
        ..DatasetOptions::default()
    };
    Dataset::open_ex(path, options).map_err(|e| FilegdbError::open_failed(path, e.to_string()))
}

/// Convertit une valeur de champ OGR en JSON en gardant le type natif
fn field_to_json(value: Option<FieldValue>) -> Value {
    match value {
        None => Value::Null,
        Some(FieldValue::IntegerValue(v)) => Value::from(v),
        Some(FieldValue::Integer64Value(v)) => Value::from(v),
        Some(FieldValue::RealValue(v)) => number_or_null(v),
        Some(FieldValue::StringValue(v)) => Value::String(v),
        Some(FieldValue::IntegerListValue(v)) => Value::from(v),
        Some(FieldValue::Integer64ListValue(v)) => Value::from(v),
        Some(FieldValue::RealListValue(v)) => {
            Value::Array(v.into_iter().map(number_or_null).collect())
        }
        Some(FieldValue::StringListValue(v)) => Value::from(v),
        // Dates et heures: représentation ISO de GDAL
        Some(other) => other.into_string().map_or(Value::Null, Value::String),
    }
}

/// NaN et infinis n'existent pas en JSON
fn number_or_null(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}
