//! Point d'entrée CLI pour gdb2geojson

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use filegdb::BackendSelection;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

/// Convertir une géodatabase ArcGIS (.gdb) en fichiers GeoJSON
#[derive(Parser)]
#[command(name = "gdb2geojson")]
#[command(author, version)]
#[command(about = "Convert ArcGIS File Geodatabase (.gdb) feature classes to GeoJSON (WGS84)")]
#[command(long_about = "Convert ArcGIS File Geodatabase (.gdb) feature classes to GeoJSON.\n\nEvery layer is reprojected to WGS84 (lon/lat) and written to <output>/<layer>.geojson.\nUses GDAL when built with the 'gdal' feature, otherwise the ogrinfo/ogr2ogr tools.")]
struct Cli {
    /// Path to .gdb file or directory
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output directory for GeoJSON files [default: ./geojson]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Specific layer name to convert (converts all if omitted)
    #[arg(short, long, value_name = "NAME")]
    layer: Option<String>,

    /// List layers in GDB then exit
    #[arg(long)]
    list: bool,

    /// Backend: auto, gdal or ogr [default: auto]
    #[arg(long, value_name = "BACKEND")]
    backend: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the conversion report as JSON (convert-all only)
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let Some(input) = cli.input else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = cli::resolve_config(cli.config.as_deref(), cli.output, cli.backend)?;

    filegdb::ensure_exists(&input)?;

    // Détection unique du backend
    let selection = BackendSelection::detect(config.backend_preference()?, &config.ogr_tools());
    info!(backend = selection.label(), input = %input.display(), "Backend selected");
    let backend = selection.backend().ok_or_else(filegdb::unavailable)?;

    if cli.list {
        cli::cmd_list(backend, &input)?;
    } else if let Some(layer) = cli.layer {
        cli::cmd_convert_layer(backend, &input, &layer, &config)?;
    } else {
        cli::cmd_convert_all(backend, &input, &config, cli.report.as_deref())?;
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
