//! Rapport de conversion
//!
//! Collecte le résultat de chaque couche d'un lot: une couche en échec est
//! consignée puis ignorée, le lot continue.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::convert::LayerSummary;
use crate::export::Extent;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStatus {
    /// Toutes les couches converties
    Success,
    /// Certaines couches en échec
    PartialSuccess,
    /// Aucune couche convertie
    Failed,
    /// Conteneur sans couche
    Empty,
}

/// Résultat d'une couche
#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    /// Nom de la couche
    pub layer: String,
    /// Fichier écrit (absent en cas d'échec)
    pub path: Option<PathBuf>,
    /// Nombre de features écrites
    pub features: usize,
    /// Système source, si connu
    pub source_crs: Option<String>,
    /// Vrai si les coordonnées ont été transformées vers WGS84
    pub reprojected: bool,
    /// Emprise lon/lat
    pub extent: Option<Extent>,
    /// Géométries hors bornes lon/lat
    pub out_of_range: usize,
    /// Message d'erreur
    pub error: Option<String>,
}

impl LayerReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Rapport complet d'une conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Conteneur source
    pub input: PathBuf,
    /// Dossier de sortie
    pub output_dir: PathBuf,
    /// Backend utilisé
    pub backend: String,
    /// Durée totale
    pub duration_secs: f64,
    /// Statut global
    pub status: ConversionStatus,
    /// Couches dans l'ordre de traitement
    pub layers: Vec<LayerReport>,
}

impl ConversionReport {
    /// Crée un rapport vide
    pub fn new(input: &Path, output_dir: &Path, backend: &str) -> Self {
        Self {
            input: input.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            backend: backend.to_string(),
            duration_secs: 0.0,
            status: ConversionStatus::Empty,
            layers: Vec::new(),
        }
    }

    /// Enregistre une couche convertie
    pub fn record_success(&mut self, summary: &LayerSummary) {
        self.layers.push(LayerReport {
            layer: summary.name.clone(),
            path: Some(summary.path.clone()),
            features: summary.features,
            source_crs: summary.source_crs.clone(),
            reprojected: summary.reprojected,
            extent: summary.check.extent,
            out_of_range: summary.check.out_of_range,
            error: None,
        });
    }

    /// Enregistre une couche en échec
    pub fn record_failure(&mut self, layer: &str, message: &str) {
        self.layers.push(LayerReport {
            layer: layer.to_string(),
            path: None,
            features: 0,
            source_crs: None,
            reprojected: false,
            extent: None,
            out_of_range: 0,
            error: Some(message.to_string()),
        });
    }

    /// Définit la durée de la conversion
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let converted = self.converted().count();
        let failed = self.failed().count();

        self.status = match (converted, failed) {
            (0, 0) => ConversionStatus::Empty,
            (_, 0) => ConversionStatus::Success,
            (0, _) => ConversionStatus::Failed,
            _ => ConversionStatus::PartialSuccess,
        };
    }

    /// Couches converties
    pub fn converted(&self) -> impl Iterator<Item = &LayerReport> {
        self.layers.iter().filter(|l| l.is_success())
    }

    /// Couches en échec
    pub fn failed(&self) -> impl Iterator<Item = &LayerReport> {
        self.layers.iter().filter(|l| !l.is_success())
    }

    /// Nombre total de features écrites
    pub fn total_features(&self) -> usize {
        self.converted().map(|l| l.features).sum()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n=== Summary ===");
        println!("Status: {:?}", self.status);
        println!("Backend: {}", self.backend);
        println!(
            "Layers: {} converted, {} failed",
            self.converted().count(),
            self.failed().count()
        );
        println!("Features: {}", self.total_features());
        println!("Duration: {:.2}s", self.duration_secs);

        let failed: Vec<_> = self.failed().collect();
        if !failed.is_empty() {
            println!("\nSkipped layers:");
            for l in failed {
                println!("  {}: {}", l.layer, l.error.as_deref().unwrap_or_default());
            }
        }
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} layers converted, {} failed, {} features",
            self.input.display(),
            self.converted().count(),
            self.failed().count(),
            self.total_features()
        )
    }
}
