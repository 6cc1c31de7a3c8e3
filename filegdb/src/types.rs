//! Types de données pour le crate filegdb

use serde_json::{Map, Value};

/// Code EPSG du système de sortie (WGS84, ordre lon/lat)
pub const WGS84_EPSG: u32 = 4326;

/// Une couche lue et reprojetée en WGS84
#[derive(Debug, Clone, Default)]
pub struct LayerData {
    /// Nom de la couche dans le conteneur
    pub name: String,

    /// Système source (ex: "EPSG:32749"), si connu
    pub source_crs: Option<String>,

    /// Vrai si une transformation de coordonnées a été appliquée
    pub reprojected: bool,

    /// Features dans l'ordre natif de lecture
    pub features: Vec<Feature>,
}

/// Une feature: géométrie GeoJSON optionnelle et attributs ordonnés
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    /// Géométrie en lon/lat WGS84, `None` si la feature n'en a pas
    pub geometry: Option<geojson::Geometry>,

    /// Attributs dans l'ordre de définition des champs
    pub properties: Map<String, Value>,
}

impl LayerData {
    /// Crée une couche vide
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Nombre de features lues
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
