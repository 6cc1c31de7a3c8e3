//! Implémentation des commandes CLI
//!
//! - `--list`: liste des couches
//! - `--layer NAME`: conversion d'une couche
//! - par défaut: conversion de toutes les couches

use std::path::{Path, PathBuf};

use anyhow::Result;
use filegdb::Backend;
use gdb2geojson::config::Config;
use gdb2geojson::convert::{self, ConvertOptions, Progress};
use gdb2geojson::export::layer_output_path;
use gdb2geojson::LayerReport;
use tracing::info;

/// Construit la configuration: défaut ou fichier, puis env, puis options CLI
pub fn resolve_config(
    path: Option<&Path>,
    output: Option<PathBuf>,
    backend: Option<String>,
) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    apply_overrides(&mut config, output, backend);
    Ok(config)
}

fn apply_overrides(config: &mut Config, output: Option<PathBuf>, backend: Option<String>) {
    if let Some(output) = output {
        config.output = output;
    }
    if let Some(backend) = backend {
        config.backend = backend;
    }
}

/// Exécute `--list`
pub fn cmd_list(backend: &dyn Backend, input: &Path) -> Result<()> {
    let layers = convert::list_layers(backend, input)?;

    println!("\nLayers in {}:", input.display());
    for (i, name) in layers.iter().enumerate() {
        println!("{}", format_layer_line(i + 1, name));
    }

    Ok(())
}

/// Exécute la conversion d'une seule couche
pub fn cmd_convert_layer(
    backend: &dyn Backend,
    input: &Path,
    layer: &str,
    config: &Config,
) -> Result<()> {
    let output_path = layer_output_path(&config.output, layer);
    let options = ConvertOptions {
        indent: config.indent,
    };

    let summary = convert::convert_layer(backend, input, layer, &output_path, &options)?;
    println!(
        "Converted '{}' -> {} ({} features)",
        summary.name,
        summary.path.display(),
        summary.features
    );

    Ok(())
}

/// Exécute la conversion de toutes les couches
pub fn cmd_convert_all(
    backend: &dyn Backend,
    input: &Path,
    config: &Config,
    report_path: Option<&Path>,
) -> Result<()> {
    let options = ConvertOptions {
        indent: config.indent,
    };

    let report = convert::convert_all(backend, input, &config.output, &options, |progress| {
        println!("{}", format_progress(progress))
    })?;

    report.display();
    info!(summary = %report.summary(), "Conversion finished");

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(report = %path.display(), "Report saved");
    }

    println!("\nDone! GeoJSON files saved to: {}/", config.output.display());
    println!("Upload the .geojson files via Admin Panel -> Layer GIS -> Upload GeoJSON");

    Ok(())
}

/// Ligne de la liste des couches, numérotée à partir de 1
fn format_layer_line(index: usize, name: &str) -> String {
    format!("  {:2}. {}", index, name)
}

/// Ligne affichée pour chaque étape d'un lot
fn format_progress(progress: Progress<'_>) -> String {
    match progress {
        Progress::Started { layers } => format!("Found {} layers. Converting all...", layers),
        Progress::Layer(layer) => format_outcome(layer),
    }
}

/// Ligne affichée après chaque couche d'un lot
fn format_outcome(layer: &LayerReport) -> String {
    match (&layer.path, &layer.error) {
        (_, Some(error)) => format!("Skipped '{}': {}", layer.layer, error),
        (Some(path), None) => format!(
            "Converted '{}' -> {} ({} features)",
            layer.layer,
            path.display(),
            layer.features
        ),
        (None, None) => format!("Converted '{}' ({} features)", layer.layer, layer.features),
    }
}
