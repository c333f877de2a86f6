//! Engine error types

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::ObjError;

/// Error type for engine operations
#[derive(Debug)]
pub enum EngineError {
    /// A required plugin library was not found in any search path
    PluginNotFound { name: String, searched: Vec<PathBuf> },
    /// The factory has no component with this type name
    UnknownComponent { type_name: String, node: String },
    /// A mandatory parameter was not given
    MissingParam { component: String, param: &'static str },
    /// A parameter had the wrong type or shape
    InvalidParam {
        component: String,
        param: &'static str,
        expected: &'static str,
    },
    /// An `@name` link did not match any component in scope
    UnresolvedLink { component: String, link: String },
    /// An asset file could not be read
    Io { path: PathBuf, source: io::Error },
    /// A mesh file could not be parsed
    Mesh { path: PathBuf, source: ObjError },
    /// A scene was already loaded into this engine
    AlreadyLoaded,
    /// Operation needs a loaded scene
    NotLoaded,
    /// Operation needs an initialized simulation
    NotInitialized,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::PluginNotFound { name, searched } => {
                write!(f, "Plugin '{}' not found (searched {} paths", name, searched.len())?;
                for path in searched {
                    write!(f, ", {}", path.display())?;
                }
                write!(f, ")")
            }
            EngineError::UnknownComponent { type_name, node } => {
                write!(f, "Unknown component '{}' in node '{}'", type_name, node)
            }
            EngineError::MissingParam { component, param } => {
                write!(f, "{}: missing parameter '{}'", component, param)
            }
            EngineError::InvalidParam {
                component,
                param,
                expected,
            } => write!(f, "{}: parameter '{}' must be {}", component, param, expected),
            EngineError::UnresolvedLink { component, link } => {
                write!(f, "{}: link '@{}' does not name a component in scope", component, link)
            }
            EngineError::Io { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            EngineError::Mesh { path, source } => {
                write!(f, "Failed to load mesh '{}': {}", path.display(), source)
            }
            EngineError::AlreadyLoaded => write!(f, "A scene is already loaded"),
            EngineError::NotLoaded => write!(f, "No scene loaded"),
            EngineError::NotInitialized => write!(f, "Simulation not initialized"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io { source, .. } => Some(source),
            EngineError::Mesh { source, .. } => Some(source),
            _ => None,
        }
    }
}
