//! Simulation engine seam
//!
//! The viewer never talks to a concrete engine directly. Everything it needs
//! (plugin import, scene load, stepping, camera query and drawing) goes through
//! [`SimulationEngine`]. Drawing is inverted: the engine pushes its visual
//! models into a [`DrawTarget`] supplied by the renderer.

use slotmap::new_key_type;
use sofa_math::{Mat4, Vec3};

use crate::{EngineError, Node, TriangleMesh};

new_key_type! {
    /// Generational key identifying a visual model for the engine's lifetime
    pub struct VisualKey;
}

/// A renderable model produced by the engine
#[derive(Debug, Clone)]
pub struct VisualModel {
    pub name: String,
    pub mesh: TriangleMesh,
    /// Linear RGBA colour
    pub color: [f32; 4],
    /// Bumped whenever `mesh` changes, so renderers know to re-upload
    pub revision: u64,
}

/// Directional light; `direction` points from the scene towards the light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: [f32; 3],
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 0.0, -1.0),
            color: [1.0, 1.0, 1.0],
        }
    }
}

/// Receiver for the engine's draw calls
pub trait DrawTarget {
    /// Lights active for this frame; called before any visual is drawn
    fn set_lights(&mut self, lights: &[DirectionalLight]);

    /// Draw one visual model
    fn draw_visual(&mut self, key: VisualKey, visual: &VisualModel);
}

/// Binding layer to a simulation engine
///
/// Call order: `import_plugin`* → `load` → `init` → `init_visual`, then once
/// per frame `animate` → `update_visual` → `draw`.
pub trait SimulationEngine {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Make a plugin available before the scene is loaded
    fn import_plugin(&mut self, name: &str) -> Result<(), EngineError>;

    /// Instantiate the scene graph; the engine takes ownership of it
    fn load(&mut self, root: Node) -> Result<(), EngineError>;

    /// Initialize the simulation after loading
    fn init(&mut self) -> Result<(), EngineError>;

    /// The scene's timestep in seconds
    fn dt(&self) -> f64;

    /// Advance the simulation by `dt` seconds
    fn animate(&mut self, dt: f64) -> Result<(), EngineError>;

    /// Propagate simulation state into the visual models
    fn update_visual(&mut self) -> Result<(), EngineError>;

    /// Prepare visual resources (normals, textures) once a display exists
    fn init_visual(&mut self) -> Result<(), EngineError>;

    /// Modelview matrix of the scene camera, if the scene has one
    fn camera_view_matrix(&self) -> Option<Mat4>;

    /// Hand the scene's lights and visual models to `target`
    fn draw(&self, target: &mut dyn DrawTarget);
}
