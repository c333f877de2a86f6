//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use sofa_viewer::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("SFV_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("SFV_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_nested_env_override() {
    std::env::set_var("SFV_ENGINE__DT", "0.02");
    std::env::set_var("SFV_ENGINE__ROOT_ENV", "MY_SOFA");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.engine.dt, 0.02);
    assert_eq!(config.engine.root_env, "MY_SOFA");
    std::env::remove_var("SFV_ENGINE__DT");
    std::env::remove_var("SFV_ENGINE__ROOT_ENV");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("SFV_WINDOW__TITLE");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load_from(cwd.join("config")).unwrap();
    assert_eq!(config.overlay.image_path.to_str(), Some("logos/splash.png"));
    assert_eq!(config.engine.plugin_dirs, vec!["bin", "lib"]);
}
