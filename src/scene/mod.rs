//! Scene construction utilities
//!
//! This module provides a declarative API for building the engine scene graph.

mod scene_builder;

pub use scene_builder::{create_scene, overhead_camera, SceneBuilder, REQUIRED_PLUGINS, UMBRELLA_PLUGIN};
