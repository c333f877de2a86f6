//! Per-phase render state and projections
//!
//! A frame is drawn in two phases: the splash overlay in pixel space, then
//! the engine's scene in perspective. Each phase carries the fixed-function
//! state it expects, which the pipelines are built to honour.

use bitflags::bitflags;
use sofa_math::mat4::{self, Mat4};

bitflags! {
    /// Fixed-function state enabled while drawing a phase
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RenderState: u8 {
        /// Depth buffer is tested and written
        const DEPTH_TEST = 1 << 0;
        /// Source-alpha blending
        const BLEND      = 1 << 1;
        /// Directional lighting is applied
        const LIGHTING   = 1 << 2;
        /// Fragments are sampled from a texture
        const TEXTURE_2D = 1 << 3;

        /// State for the 2-D splash overlay
        const OVERLAY = Self::BLEND.bits() | Self::TEXTURE_2D.bits();
        /// State for the lit 3-D scene
        const SCENE = Self::DEPTH_TEST.bits() | Self::LIGHTING.bits();
    }
}

bitflags! {
    /// Buffers cleared at the start of a frame
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;

        const ALL = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

impl RenderState {
    /// Color blending for pipelines drawn in this state
    pub fn blend_state(self) -> Option<wgpu::BlendState> {
        if self.contains(RenderState::BLEND) {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        } else {
            Some(wgpu::BlendState::REPLACE)
        }
    }

    /// Depth behaviour against a shared depth attachment
    ///
    /// Without `DEPTH_TEST` fragments always pass and leave depth untouched.
    pub fn depth_stencil(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let depth_test = self.contains(RenderState::DEPTH_TEST);
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: depth_test,
            depth_compare: if depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

impl ClearFlags {
    /// Load operation for the color attachment
    pub fn color_load(self, color: [f32; 4]) -> wgpu::LoadOp<wgpu::Color> {
        if self.contains(ClearFlags::COLOR) {
            wgpu::LoadOp::Clear(wgpu::Color {
                r: color[0] as f64,
                g: color[1] as f64,
                b: color[2] as f64,
                a: color[3] as f64,
            })
        } else {
            wgpu::LoadOp::Load
        }
    }

    /// Load operation for the depth attachment
    pub fn depth_load(self) -> wgpu::LoadOp<f32> {
        if self.contains(ClearFlags::DEPTH) {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        }
    }
}

/// Perspective parameters for the scene phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

impl ProjectionSettings {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        mat4::perspective(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Pixel-space projection for the overlay: origin at the top-left, y down
///
/// Matches `ortho_2d(0, width, height, 1)`: row 1 maps to the top edge.
pub fn overlay_projection(width: u32, height: u32) -> Mat4 {
    mat4::ortho_2d(0.0, width as f32, height as f32, 1.0)
}

/// Perspective projection for the scene phase
pub fn scene_projection(settings: &ProjectionSettings, width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    settings.matrix(aspect)
}
