//! Math Library
//!
//! This crate provides the small amount of linear algebra the viewer needs.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Mat4`] - 4x4 column-major matrix, laid out the way shaders expect it
//!
//! Projection helpers produce right-handed matrices with a zero-to-one depth
//! range, which is what wgpu clips against.

mod vec3;
pub mod mat4;

pub use vec3::Vec3;
pub use mat4::Mat4;
