//! Integration tests for engine startup
//!
//! Builds a throwaway engine root with plugin libraries and a mesh, then runs
//! the same startup sequence as the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use sofa_core::{EngineError, SimulationEngine};
use sofa_viewer::config::AppConfig;
use sofa_viewer::error::AppError;
use sofa_viewer::scene::{REQUIRED_PLUGINS, UMBRELLA_PLUGIN};
use sofa_viewer::startup::{engine_root, initialize_engine, preview_engine};

const TETRA_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";

fn scratch_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sfv_startup_{}_{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("lib")).unwrap();
    fs::create_dir_all(dir.join("bin")).unwrap();
    fs::create_dir_all(dir.join("mesh")).unwrap();
    fs::write(dir.join("mesh/tetra.obj"), TETRA_OBJ).unwrap();
    dir
}

fn install_plugin(root: &Path, name: &str) {
    fs::write(root.join("lib").join(format!("lib{}.so", name)), b"").unwrap();
}

fn config_for(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.scene.asset_root = root.to_path_buf();
    config.scene.mesh_path = "mesh/tetra.obj".to_string();
    config
}

#[test]
fn test_startup_sequence() {
    let root = scratch_root("ok");
    install_plugin(&root, UMBRELLA_PLUGIN);
    for plugin in REQUIRED_PLUGINS {
        install_plugin(&root, plugin);
    }

    let config = config_for(&root);
    let mut engine = preview_engine(&config, &root);
    initialize_engine(&mut engine, &config).unwrap();

    assert_eq!(engine.visual_count(), 1);
    assert_eq!(engine.lights().len(), 1);
    assert!(engine.camera_view_matrix().is_some());
    assert_eq!(engine.plugins().len(), REQUIRED_PLUGINS.len() + 1);
    assert!(engine.animate(engine.dt()).is_ok());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_missing_plugin_is_fatal() {
    let root = scratch_root("missing");
    install_plugin(&root, UMBRELLA_PLUGIN);

    let config = config_for(&root);
    let mut engine = preview_engine(&config, &root);
    let err = initialize_engine(&mut engine, &config).unwrap_err();

    match err {
        EngineError::PluginNotFound { name, searched } => {
            assert_eq!(name, REQUIRED_PLUGINS[0]);
            assert_eq!(searched, vec![root.join("bin"), root.join("lib")]);
        }
        other => panic!("unexpected error: {}", other),
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_unverified_plugins_continue() {
    let root = scratch_root("unverified");

    let mut config = config_for(&root);
    config.engine.verify_plugins = false;
    let mut engine = preview_engine(&config, &root);
    initialize_engine(&mut engine, &config).unwrap();

    assert_eq!(engine.visual_count(), 1);
    assert!(engine.plugins().iter().all(|p| p.path.is_none()));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
#[serial]
fn test_engine_root_from_env() {
    std::env::set_var("SFV_TEST_SOFA_ROOT", "/opt/sofa");
    assert_eq!(engine_root("SFV_TEST_SOFA_ROOT").unwrap(), PathBuf::from("/opt/sofa"));

    std::env::remove_var("SFV_TEST_SOFA_ROOT");
    let err = engine_root("SFV_TEST_SOFA_ROOT").unwrap_err();
    assert!(matches!(err, AppError::EngineRootMissing { .. }));
    assert_eq!(err.to_string(), "Environment variable SFV_TEST_SOFA_ROOT is not set");
}
