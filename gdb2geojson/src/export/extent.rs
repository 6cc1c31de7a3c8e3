//! Emprise d'une couche et contrôle des bornes lon/lat

use filegdb::LayerData;
use geo::{BoundingRect, Rect};
use serde::Serialize;
use tracing::trace;

/// Emprise `[min_lon, min_lat, max_lon, max_lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent(pub [f64; 4]);

impl Extent {
    fn from_rect(rect: Rect) -> Self {
        Self([rect.min().x, rect.min().y, rect.max().x, rect.max().y])
    }

    fn merge(self, other: Extent) -> Self {
        let [a0, a1, a2, a3] = self.0;
        let [b0, b1, b2, b3] = other.0;
        Self([a0.min(b0), a1.min(b1), a2.max(b2), a3.max(b3)])
    }

    /// Vrai si l'emprise tient dans [-180,180] x [-90,90]
    pub fn is_geographic(&self) -> bool {
        let [min_x, min_y, max_x, max_y] = self.0;
        min_x >= -180.0 && max_x <= 180.0 && min_y >= -90.0 && max_y <= 90.0
    }
}

/// Résultat du contrôle d'une couche
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtentCheck {
    /// Emprise de toutes les géométries, `None` si aucune
    pub extent: Option<Extent>,

    /// Nombre de géométries hors des bornes lon/lat
    pub out_of_range: usize,
}

/// Calcule l'emprise d'une couche et compte les géométries hors bornes
pub fn check_layer(layer: &LayerData) -> ExtentCheck {
    let mut check = ExtentCheck::default();

    for geometry in layer.features.iter().filter_map(|f| f.geometry.as_ref()) {
        let geometry: geo::Geometry<f64> = match geometry.clone().try_into() {
            Ok(g) => g,
            Err(e) => {
                trace!(layer = %layer.name, error = %e, "Geometry skipped for extent");
                continue;
            }
        };

        let Some(rect) = geometry.bounding_rect() else {
            continue;
        };
        let extent = Extent::from_rect(rect);

        if !extent.is_geographic() {
            check.out_of_range += 1;
        }
        check.extent = Some(match check.extent {
            Some(current) => current.merge(extent),
            None => extent,
        });
    }

    check
}
