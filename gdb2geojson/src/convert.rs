//! Orchestration des conversions: lister, convertir une couche, tout convertir
//!
//! Le backend est choisi une fois au démarrage puis passé à chaque opération.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use filegdb::Backend;
use tracing::{debug, info, warn};

use crate::export::{check_layer, export_to_geojson, layer_output_path, ExtentCheck};
use crate::report::{ConversionReport, LayerReport};

/// Options d'écriture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Indentation du JSON
    pub indent: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Résultat de la conversion d'une couche
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub name: String,
    pub path: PathBuf,
    pub features: usize,
    pub source_crs: Option<String>,
    pub reprojected: bool,
    pub check: ExtentCheck,
}

/// Avancement d'un lot, transmis à l'appelant
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// Couches trouvées, avant la première conversion
    Started { layers: usize },
    /// Une couche traitée, réussie ou non
    Layer(&'a LayerReport),
}

/// Liste les couches du conteneur dans l'ordre natif
pub fn list_layers(backend: &dyn Backend, input: &Path) -> Result<Vec<String>> {
    filegdb::ensure_exists(input)?;
    let layers = backend.list_layers(input)?;
    debug!(input = %input.display(), backend = backend.name(), count = layers.len(), "Layers listed");
    Ok(layers)
}

/// Convertit une couche vers `output_path`
pub fn convert_layer(
    backend: &dyn Backend,
    input: &Path,
    layer: &str,
    output_path: &Path,
    options: &ConvertOptions,
) -> Result<LayerSummary> {
    filegdb::ensure_exists(input)?;

    let data = backend.read_layer(input, layer)?;
    let check = check_layer(&data);

    if check.out_of_range > 0 {
        warn!(
            layer,
            out_of_range = check.out_of_range,
            "Geometries outside lon/lat bounds"
        );
    }

    export_to_geojson(&data, output_path, options.indent)?;

    info!(
        layer,
        features = data.len(),
        source_crs = ?data.source_crs,
        reprojected = data.reprojected,
        extent = ?check.extent.map(|e| e.0),
        output = %output_path.display(),
        "Layer converted"
    );

    Ok(LayerSummary {
        name: data.name.clone(),
        path: output_path.to_path_buf(),
        features: data.len(),
        source_crs: data.source_crs.clone(),
        reprojected: data.reprojected,
        check,
    })
}

/// Convertit toutes les couches vers `<output_dir>/<layer>.geojson`
///
/// Une couche en échec est consignée dans le rapport et le lot continue.
/// `on_progress` reçoit le nombre de couches puis chaque couche traitée.
pub fn convert_all<F>(
    backend: &dyn Backend,
    input: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
    mut on_progress: F,
) -> Result<ConversionReport>
where
    F: FnMut(Progress<'_>),
{
    let started_at = Instant::now();
    let layers = list_layers(backend, input)?;

    info!(count = layers.len(), input = %input.display(), "Converting all layers");

    std::fs::create_dir_all(output_dir)
        .context(format!("Failed to create directory: {}", output_dir.display()))?;

    let mut report = ConversionReport::new(input, output_dir, backend.name());
    on_progress(Progress::Started {
        layers: layers.len(),
    });

    for layer in &layers {
        let output_path = layer_output_path(output_dir, layer);

        match convert_layer(backend, input, layer, &output_path, options) {
            Ok(summary) => report.record_success(&summary),
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(layer = %layer, error = %message, "Layer skipped");
                report.record_failure(layer, &message);
            }
        }

        if let Some(last) = report.layers.last() {
            on_progress(Progress::Layer(last));
        }
    }

    report.set_duration(started_at.elapsed());
    report.finalize();

    Ok(report)
}
