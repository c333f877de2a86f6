//! Engine startup
//!
//! Locates the engine installation, prepares the plugin search paths and
//! brings the scene from description to an initialized simulation.

use std::path::{Path, PathBuf};

use sofa_core::{EngineError, PluginRepository, PreviewEngine, PreviewSettings, SimulationEngine};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::scene::{create_scene, UMBRELLA_PLUGIN};

/// Read the engine root directory from the environment variable `var`
pub fn engine_root(var: &str) -> Result<PathBuf, AppError> {
    match std::env::var_os(var) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(AppError::EngineRootMissing {
            var: var.to_string(),
        }),
    }
}

/// Plugin search paths under `root`, searched in the order of `dirs`
pub fn plugin_repository(root: &Path, dirs: &[String]) -> PluginRepository {
    let mut repository = PluginRepository::new();
    for dir in dirs.iter().rev() {
        repository.add_first_path(root.join(dir));
    }
    repository
}

/// Preview engine configured from `config` with plugins under `root`
pub fn preview_engine(config: &AppConfig, root: &Path) -> PreviewEngine {
    let settings = PreviewSettings {
        dt: config.engine.dt,
        verify_plugins: config.engine.verify_plugins,
        asset_root: config.scene.asset_root.clone(),
    };
    PreviewEngine::new(settings, plugin_repository(root, &config.engine.plugin_dirs))
}

/// Import the umbrella plugin, build the scene, load it and initialize
pub fn initialize_engine(
    engine: &mut dyn SimulationEngine,
    config: &AppConfig,
) -> Result<(), EngineError> {
    engine.import_plugin(UMBRELLA_PLUGIN)?;
    log::info!("Imported {} into the {} engine", UMBRELLA_PLUGIN, engine.name());

    let root = create_scene(&config.scene.mesh_path);
    engine.load(root)?;
    engine.init()?;
    log::info!("Simulation initialized (dt = {})", engine.dt());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_search_order() {
        let dirs = vec!["bin".to_string(), "lib".to_string()];
        let repository = plugin_repository(Path::new("/opt/sofa"), &dirs);
        assert_eq!(
            repository.paths(),
            &[PathBuf::from("/opt/sofa/bin"), PathBuf::from("/opt/sofa/lib")]
        );
    }

    #[test]
    fn test_missing_root_variable() {
        let result = engine_root("SFV_TEST_ROOT_THAT_IS_NEVER_SET");
        assert!(matches!(result, Err(AppError::EngineRootMissing { var }) if var == "SFV_TEST_ROOT_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_preview_engine_settings() {
        let mut config = AppConfig::default();
        config.engine.dt = 0.05;
        let engine = preview_engine(&config, Path::new("/opt/sofa"));
        assert_eq!(engine.dt(), 0.05);
    }
}
