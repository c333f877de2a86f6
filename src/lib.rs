//! SOFA scene viewer
//!
//! Builds a small SOFA scene (light, camera, one mesh), shows a splash image
//! and renders the simulation every timestep until Escape is pressed.

pub mod config;
pub mod error;
pub mod input;
pub mod scene;
pub mod startup;
pub mod systems;
