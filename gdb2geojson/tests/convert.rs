//! Tests d'intégration de l'orchestration avec un backend en mémoire

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use filegdb::{Backend, Feature, FilegdbError, LayerData};
use gdb2geojson::{
    convert_all, convert_layer, list_layers, ConversionStatus, ConvertOptions, Progress,
};
use serde_json::{json, Map, Value};

/// Backend de test: couches prédéfinies, certaines en erreur
struct MemoryBackend {
    layers: Vec<(String, Option<LayerData>)>,
    reads: RefCell<Vec<String>>,
}

impl MemoryBackend {
    fn new() -> Self {
        Self {
            layers: Vec::new(),
            reads: RefCell::new(Vec::new()),
        }
    }

    fn with_layer(mut self, layer: LayerData) -> Self {
        self.layers.push((layer.name.clone(), Some(layer)));
        self
    }

    fn with_broken_layer(mut self, name: &str) -> Self {
        self.layers.push((name.to_string(), None));
        self
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn list_layers(&self, _path: &Path) -> filegdb::Result<Vec<String>> {
        Ok(self.layers.iter().map(|(name, _)| name.clone()).collect())
    }

    fn read_layer(&self, path: &Path, layer: &str) -> filegdb::Result<LayerData> {
        self.reads.borrow_mut().push(layer.to_string());
        match self.layers.iter().find(|(name, _)| name == layer) {
            Some((_, Some(data))) => Ok(data.clone()),
            Some((_, None)) => Err(FilegdbError::invalid_feature(
                layer,
                "unsupported field type",
            )),
            None => Err(FilegdbError::layer_not_found(layer, path)),
        }
    }
}

fn point(lon: f64, lat: f64, name: &str) -> Feature {
    let mut properties = Map::new();
    properties.insert("nama".to_string(), json!(name));
    properties.insert("jumlah_kios".to_string(), json!(10));
    Feature {
        geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![lon, lat]))),
        properties,
    }
}

fn layer(name: &str, features: Vec<Feature>) -> LayerData {
    LayerData {
        name: name.to_string(),
        source_crs: Some("EPSG:32749".to_string()),
        reprojected: true,
        features,
    }
}

fn markets() -> LayerData {
    layer(
        "Markets",
        vec![
            point(110.4203, -6.9716, "Pasar Johar"),
            point(110.4095, -6.9839, "Pasar Bulu"),
            Feature {
                geometry: None,
                properties: Map::new(),
            },
        ],
    )
}

fn roads() -> LayerData {
    let mut properties = Map::new();
    properties.insert("nama_jalan".to_string(), json!("Jl. Pemuda"));
    layer(
        "Roads",
        vec![Feature {
            geometry: Some(geojson::Geometry::new(geojson::Value::LineString(vec![
                vec![110.41, -6.98],
                vec![110.42, -6.97],
            ]))),
            properties,
        }],
    )
}

/// Conteneur factice sur disque (le chemin doit exister)
fn container(dir: &Path) -> PathBuf {
    let path = dir.join("city.gdb");
    std::fs::create_dir_all(&path).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn geojson_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/*.geojson", dir.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    files
}

#[test]
fn test_list_layers_keeps_container_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let backend = MemoryBackend::new()
        .with_layer(roads())
        .with_layer(markets())
        .with_broken_layer("Broken");

    let layers = list_layers(&backend, &input).unwrap();
    assert_eq!(layers, vec!["Roads", "Markets", "Broken"]);
}

#[test]
fn test_missing_container() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.gdb");
    let backend = MemoryBackend::new().with_layer(markets());

    let err = list_layers(&backend, &missing).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FilegdbError>(),
        Some(FilegdbError::NotFound(_))
    ));

    let err = convert_all(
        &backend,
        &missing,
        &dir.path().join("out"),
        &ConvertOptions::default(),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FilegdbError>(),
        Some(FilegdbError::NotFound(_))
    ));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_convert_one_layer() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let output = dir.path().join("out").join("Markets.geojson");
    let backend = MemoryBackend::new().with_layer(markets()).with_layer(roads());

    let summary =
        convert_layer(&backend, &input, "Markets", &output, &ConvertOptions::default()).unwrap();
    assert_eq!(summary.name, "Markets");
    assert_eq!(summary.features, 3);
    assert_eq!(summary.path, output);
    assert_eq!(summary.check.out_of_range, 0);

    let json = read_json(&output);
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["name"], "Markets");
    assert_eq!(
        json["crs"]["properties"]["name"],
        "urn:ogc:def:crs:OGC:1.3:CRS84"
    );
    assert_eq!(json["features"].as_array().unwrap().len(), 3);
    assert_eq!(json["features"][0]["properties"]["nama"], "Pasar Johar");
    assert_eq!(json["features"][2]["geometry"], Value::Null);

    // Seule la couche demandée est lue
    assert_eq!(*backend.reads.borrow(), vec!["Markets"]);
}

#[test]
fn test_convert_unknown_layer() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let output = dir.path().join("out").join("Parks.geojson");
    let backend = MemoryBackend::new().with_layer(markets());

    let err = convert_layer(&backend, &input, "Parks", &output, &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FilegdbError>(),
        Some(FilegdbError::LayerNotFound { layer, .. }) if layer == "Parks"
    ));
    assert!(!output.exists());
}

#[test]
fn test_convert_all_city_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let out = dir.path().join("out");
    let backend = MemoryBackend::new().with_layer(markets()).with_layer(roads());

    let report = convert_all(&backend, &input, &out, &ConvertOptions::default(), |_| {}).unwrap();

    assert_eq!(report.status, ConversionStatus::Success);
    assert_eq!(report.backend, "memory");
    assert_eq!(
        geojson_files(&out),
        vec![out.join("Markets.geojson"), out.join("Roads.geojson")]
    );

    assert_eq!(read_json(&out.join("Markets.geojson"))["features"].as_array().unwrap().len(), 3);
    assert_eq!(read_json(&out.join("Roads.geojson"))["features"].as_array().unwrap().len(), 1);
    assert_eq!(report.total_features(), 4);
}

#[test]
fn test_convert_all_isolates_broken_layer() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let out = dir.path().join("out");
    let backend = MemoryBackend::new()
        .with_layer(markets())
        .with_broken_layer("Broken")
        .with_layer(roads())
        .with_layer(layer("Parks", vec![point(110.43, -6.99, "Taman")]));

    let mut started = Vec::new();
    let mut seen = Vec::new();
    let report = convert_all(
        &backend,
        &input,
        &out,
        &ConvertOptions::default(),
        |progress| match progress {
            Progress::Started { layers } => started.push((layers, seen.len())),
            Progress::Layer(l) => seen.push((l.layer.clone(), l.is_success())),
        },
    )
    .unwrap();

    // Le nombre de couches est annoncé avant la première conversion
    assert_eq!(started, vec![(4, 0)]);

    assert_eq!(report.status, ConversionStatus::PartialSuccess);
    assert_eq!(geojson_files(&out).len(), 3);
    assert!(!out.join("Broken.geojson").exists());

    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].layer, "Broken");
    assert!(failed[0]
        .error
        .as_deref()
        .unwrap()
        .contains("unsupported field type"));

    // Toutes les couches sont tentées, dans l'ordre du conteneur
    assert_eq!(
        seen,
        vec![
            ("Markets".to_string(), true),
            ("Broken".to_string(), false),
            ("Roads".to_string(), true),
            ("Parks".to_string(), true),
        ]
    );
}

#[test]
fn test_convert_all_empty_container() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let out = dir.path().join("out");

    let report = convert_all(
        &MemoryBackend::new(),
        &input,
        &out,
        &ConvertOptions::default(),
        |_| {},
    )
    .unwrap();

    assert_eq!(report.status, ConversionStatus::Empty);
    assert!(out.is_dir());
    assert!(geojson_files(&out).is_empty());
}

#[test]
fn test_conversion_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let output = dir.path().join("Markets.geojson");
    let backend = MemoryBackend::new().with_layer(markets());

    convert_layer(&backend, &input, "Markets", &output, &ConvertOptions::default()).unwrap();
    let first = std::fs::read(&output).unwrap();

    convert_layer(&backend, &input, "Markets", &output, &ConvertOptions::default()).unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_out_of_range_geometries_are_reported_but_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = container(dir.path());
    let output = dir.path().join("Raw.geojson");
    let backend = MemoryBackend::new().with_layer(layer(
        "Raw",
        vec![point(436500.0, 9229300.0, "UTM"), point(110.42, -6.97, "WGS84")],
    ));

    let summary =
        convert_layer(&backend, &input, "Raw", &output, &ConvertOptions::default()).unwrap();
    assert_eq!(summary.check.out_of_range, 1);
    assert_eq!(read_json(&output)["features"].as_array().unwrap().len(), 2);
}
