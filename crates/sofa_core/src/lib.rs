//! Core types for the SOFA scene viewer
//!
//! This crate provides everything that sits between the application and the
//! simulation engine:
//!
//! - [`ParamValue`] - Typed value of a component keyword parameter
//! - [`ObjectDesc`] - A component to instantiate: type name plus parameters
//! - [`Node`] - A scene-graph node owning objects and child nodes
//! - [`SimulationEngine`] - The engine binding seam
//! - [`DrawTarget`] - Receiver of the engine's per-frame draw calls
//! - [`PreviewEngine`] - In-process engine that interprets visual components
//! - [`PluginRepository`] - Search paths used to locate plugin libraries
//! - [`TriangleMesh`] / [`parse_obj`] - Mesh storage and Wavefront OBJ parsing

mod param;
mod scene;
mod plugin;
mod error;
mod engine;
mod mesh;
mod obj;
mod color;
mod camera;
mod preview;

pub use param::ParamValue;
pub use scene::{Node, ObjectDesc};
pub use plugin::PluginRepository;
pub use error::EngineError;
pub use engine::{DirectionalLight, DrawTarget, SimulationEngine, VisualKey, VisualModel};
pub use mesh::TriangleMesh;
pub use obj::{parse_obj, ObjError};
pub use color::parse_color;
pub use camera::InteractiveCamera;
pub use preview::{PluginRecord, PreviewEngine, PreviewSettings};

// Re-export commonly used math types for convenience
pub use sofa_math::{Mat4, Vec3};
