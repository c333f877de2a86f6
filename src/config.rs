//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`SFV_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env, Serialized}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Splash overlay configuration
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Scene projection configuration
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Scene asset configuration
    #[serde(default)]
    pub scene: SceneConfig,
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`SFV_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // SFV_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("SFV_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Borderless fullscreen instead of a debugging window
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "SOFA scene".to_string(),
            width: 1920,
            height: 1080,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Splash overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Image file, relative to the working directory
    pub image_path: PathBuf,
    /// Top-left corner in pixels [x, y], y down
    pub position: [f32; 2],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("logos/splash.png"),
            position: [640.0, 400.0],
        }
    }
}

/// Perspective projection for the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

/// Scene asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Mesh loaded by the sphere node, relative to `asset_root`
    pub mesh_path: String,
    /// Directory that relative asset paths resolve against
    pub asset_root: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh_path: "mesh/sphere.obj".to_string(),
            asset_root: PathBuf::from("."),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Environment variable naming the engine installation root
    pub root_env: String,
    /// Plugin directories under the root, searched first to last
    pub plugin_dirs: Vec<String>,
    /// Require plugin libraries to exist under the search paths
    pub verify_plugins: bool,
    /// Simulation timestep in seconds
    pub dt: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_env: "SOFA_ROOT".to_string(),
            plugin_dirs: vec!["bin".to_string(), "lib".to_string()],
            verify_plugins: true,
            dt: 0.01,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Background color [r, g, b, a]
    pub clear_color: [f32; 4],
    /// Ambient light strength
    pub ambient_strength: f32,
    /// Diffuse light strength
    pub diffuse_strength: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            clear_color: [1.0, 1.0, 1.0, 1.0],
            ambient_strength: 0.3,
            diffuse_strength: 0.7,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
