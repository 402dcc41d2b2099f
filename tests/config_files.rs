use std::fs;

use voxel_nav_terrain::{TerrainConfig, TerrainError};

#[test]
fn partial_file_overrides_only_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terrain.json");
    fs::write(
        &path,
        r#"{ "size_xz": 4, "resolution": 8, "connect_face_diagonals": true }"#,
    )
    .unwrap();

    let config = TerrainConfig::load(&path).unwrap();
    assert_eq!(config.size_xz, 4);
    assert_eq!(config.resolution, 8);
    assert!(config.connect_face_diagonals);
    assert_eq!(config.chunk_scale, TerrainConfig::default().chunk_scale);
    assert_eq!(config.chunk_count(), 4 * 3 * 4);
}

#[test]
fn out_of_range_values_name_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terrain.json");
    fs::write(&path, r#"{ "chunk_scale": -1.0 }"#).unwrap();

    match TerrainConfig::load(&path) {
        Err(TerrainError::InvalidConfig { field, .. }) => assert_eq!(field, "chunk_scale"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn config_written_by_serde_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terrain.json");
    let config = TerrainConfig {
        noise_seed: 99,
        worker_threads: 1,
        ..Default::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    assert_eq!(TerrainConfig::load(&path).unwrap(), config);
}
