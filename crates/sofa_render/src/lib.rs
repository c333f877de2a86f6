//! Rendering Library
//!
//! This crate provides the wgpu-based renderer for the scene viewer.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`texture::TextureImage`] - Decoded RGBA image with its mip chain
//! - [`overlay::ImageOverlay`] - Splash image drawn as a screen-aligned quad
//! - [`overlay::OverlayBackend`] - Seam between the overlay and the GPU
//! - [`frame`] - Fixed-function style render state and projections
//! - [`pipeline::OverlayPipeline`] - Textured quads in pixel space
//! - [`pipeline::MeshPipeline`] - Lit triangle meshes from the engine

pub mod context;
pub mod texture;
pub mod overlay;
pub mod frame;
pub mod pipeline;

pub use frame::{ClearFlags, ProjectionSettings, RenderState};
pub use overlay::{ImageOverlay, OverlayBackend, QuadCommand, TextureHandle};
pub use texture::{SamplerSettings, TextureError, TextureImage};
