//! GPU-compatible data types for the overlay and mesh pipelines
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};
use sofa_math::mat4::{self, Mat4};

/// A vertex of the 2-D overlay, in pixels
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct OverlayVertex {
    /// Position in pixels, y down
    pub position: [f32; 2],
    /// Texture coordinates, (0, 0) at the image's top-left
    pub tex_coords: [f32; 2],
}

impl OverlayVertex {
    pub fn new(position: [f32; 2], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            tex_coords,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// A vertex of an engine visual model
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Surface normal for lighting
    pub normal: [f32; 3],
    /// RGBA material color
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Uniforms for the overlay pass
/// Layout: 64 bytes total (must match overlay.wgsl OverlayUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct OverlayUniforms {
    pub projection: Mat4,
}

impl Default for OverlayUniforms {
    fn default() -> Self {
        Self {
            projection: mat4::IDENTITY,
        }
    }
}

/// Uniforms for the mesh pass
/// Layout: 176 bytes total (must match mesh.wgsl MeshUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    /// View matrix (64 bytes)
    pub view_matrix: Mat4,
    /// Projection matrix (64 bytes)
    pub projection_matrix: Mat4,
    /// Direction towards the light, w unused (16 bytes)
    pub light_dir: [f32; 4],
    /// Light color, w unused (16 bytes)
    pub light_color: [f32; 4],
    /// Lighting parameters (16 bytes)
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    /// 1.0 when lighting is on, 0.0 for flat color
    pub lighting_enabled: f32,
    pub _padding: f32,
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self {
            view_matrix: mat4::IDENTITY,
            projection_matrix: mat4::IDENTITY,
            light_dir: [0.0, 0.0, 1.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 0.0],
            ambient_strength: 0.3,
            diffuse_strength: 0.7,
            lighting_enabled: 1.0,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_overlay_vertex_size() {
        // 2 floats position + 2 floats tex_coords = 16 bytes
        assert_eq!(size_of::<OverlayVertex>(), 16);
    }

    #[test]
    fn test_mesh_vertex_size() {
        // 3 floats position + 3 floats normal + 4 floats color = 40 bytes
        assert_eq!(size_of::<MeshVertex>(), 40);
    }

    #[test]
    fn test_overlay_uniforms_size() {
        assert_eq!(size_of::<OverlayUniforms>(), 64);
    }

    #[test]
    fn test_mesh_uniforms_size() {
        // 2 matrices + light_dir + light_color + 4 floats = 44 floats = 176 bytes
        assert_eq!(size_of::<MeshUniforms>(), 176);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<OverlayVertex>(), 4);
        assert_eq!(std::mem::align_of::<MeshVertex>(), 4);
        assert_eq!(std::mem::align_of::<MeshUniforms>(), 4);
    }

    #[test]
    fn test_layout_strides() {
        assert_eq!(OverlayVertex::layout().array_stride, 16);
        assert_eq!(MeshVertex::layout().array_stride, 40);
    }
}
