//! Window management system
//!
//! Creates the display window: full-screen for a demo, windowed for
//! debugging.

use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event_loop::ActiveEventLoop,
    window::{Fullscreen, Window, WindowAttributes},
};
use crate::config::WindowConfig;

/// Owns the application window
pub struct WindowSystem {
    window: Arc<Window>,
}

impl WindowSystem {
    /// Create window from config
    pub fn create(
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<Self, WindowError> {
        let window = Arc::new(
            event_loop
                .create_window(Self::attributes(config))
                .map_err(|e| WindowError::CreationFailed(e.to_string()))?,
        );

        log::info!(
            "Opened {}x{} window '{}'{}",
            config.width,
            config.height,
            config.title,
            if config.fullscreen { " (fullscreen)" } else { "" }
        );

        Ok(Self { window })
    }

    /// Window attributes for the given configuration
    ///
    /// The size is in physical pixels so the overlay's pixel coordinates line
    /// up with the framebuffer.
    pub fn attributes(config: &WindowConfig) -> WindowAttributes {
        let mut attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(false);

        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        attrs
    }

    /// Get window reference (for RenderContext creation)
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

#[derive(Debug)]
pub enum WindowError {
    CreationFailed(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::CreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windowed_attributes() {
        let attrs = WindowSystem::attributes(&WindowConfig::default());
        assert_eq!(attrs.title, "SOFA scene");
        assert!(attrs.fullscreen.is_none());
        assert!(!attrs.resizable);
    }

    #[test]
    fn test_fullscreen_attributes() {
        let config = WindowConfig {
            fullscreen: true,
            ..Default::default()
        };
        let attrs = WindowSystem::attributes(&config);
        assert_eq!(attrs.fullscreen, Some(Fullscreen::Borderless(None)));
    }

    #[test]
    fn test_error_display() {
        let err = WindowError::CreationFailed("no display".to_string());
        assert_eq!(err.to_string(), "Window creation failed: no display");
    }
}
