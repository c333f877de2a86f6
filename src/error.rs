//! Top-level application error

use std::fmt;

use sofa_core::EngineError;

use crate::systems::{RenderError, WindowError};

/// Any failure that ends the application
#[derive(Debug)]
pub enum AppError {
    /// The environment variable naming the engine root is not set
    EngineRootMissing { var: String },
    Engine(EngineError),
    Window(WindowError),
    Render(RenderError),
    EventLoop(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EngineRootMissing { var } => {
                write!(f, "Environment variable {} is not set", var)
            }
            AppError::Engine(e) => write!(f, "Engine error: {}", e),
            AppError::Window(e) => write!(f, "{}", e),
            AppError::Render(e) => write!(f, "{}", e),
            AppError::EventLoop(msg) => write!(f, "Event loop error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Engine(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Render(e) => Some(e),
            AppError::EngineRootMissing { .. } | AppError::EventLoop(_) => None,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl From<WindowError> for AppError {
    fn from(e: WindowError) -> Self {
        AppError::Window(e)
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e)
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_root_display() {
        let err = AppError::EngineRootMissing {
            var: "SOFA_ROOT".to_string(),
        };
        assert_eq!(err.to_string(), "Environment variable SOFA_ROOT is not set");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_engine_error_wrapped() {
        let err: AppError = EngineError::NotLoaded.into();
        assert_eq!(err.to_string(), "Engine error: No scene loaded");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_render_error_wrapped() {
        let err: AppError = RenderError::OutOfMemory.into();
        assert!(matches!(err, AppError::Render(RenderError::OutOfMemory)));
        assert_eq!(err.to_string(), "Out of memory");
    }
}
