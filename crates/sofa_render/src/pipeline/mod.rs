//! Rendering pipeline components
//!
//! This module contains the two render pipelines of a frame: the splash
//! overlay and the engine's lit meshes. Both draw into one pass that shares
//! a single depth attachment.

pub mod types;
pub mod overlay_pipeline;
pub mod mesh_pipeline;

/// Format of the depth attachment shared by both pipelines
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// Re-export types
pub use types::{MeshUniforms, MeshVertex, OverlayUniforms, OverlayVertex};

// Re-export pipelines
pub use overlay_pipeline::{OverlayFrame, OverlayPipeline};
pub use mesh_pipeline::{LightingSettings, MeshFrame, MeshPipeline};
