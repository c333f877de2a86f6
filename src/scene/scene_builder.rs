//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for building the scene graph handed to the engine.

use sofa_core::{InteractiveCamera, Node, ObjectDesc};
use sofa_math::Vec3;

/// Plugin that registers every standard component, imported before the
/// scene is built
pub const UMBRELLA_PLUGIN: &str = "SofaComponentAll";

/// Plugins the scene declares through `RequiredPlugin` components
pub const REQUIRED_PLUGINS: [&str; 16] = [
    "Sofa.Component.IO.Mesh",
    "Sofa.Component.Engine.Transform",
    "Sofa.Component.LinearSolver.Direct",
    "Sofa.Component.Mass",
    "Sofa.Component.ODESolver.Backward",
    "Sofa.Component.SolidMechanics.Spring",
    "Sofa.Component.StateContainer",
    "Sofa.Component.Topology.Container.Constant",
    "Sofa.Component.Visual",
    "Sofa.GL.Component.Rendering3D",
    "SofaConstraint",
    "SofaHaptics",
    "SofaMeshCollision",
    "SofaUserInteraction",
    "Sofa.Component.SceneUtility",
    "SofaPython3",
];

/// Builder for constructing scene graphs
///
/// # Example
/// ```ignore
/// let root = SceneBuilder::new()
///     .with_required_plugins(&REQUIRED_PLUGINS)
///     .add_light_manager()
///     .add_directional_light([0.0, 1.0, 0.0])
///     .add_mesh_model("Sphere", "loader", "mesh/sphere.obj", "white")
///     .build();
/// ```
pub struct SceneBuilder {
    root: Node,
}

impl SceneBuilder {
    /// Create a builder with an empty node named `root`
    pub fn new() -> Self {
        Self {
            root: Node::new("root"),
        }
    }

    /// Declare each plugin with a `RequiredPlugin` component
    pub fn with_required_plugins(mut self, names: &[&str]) -> Self {
        for name in names {
            self.root
                .add_object(ObjectDesc::new("RequiredPlugin").with("name", *name));
        }
        self
    }

    pub fn add_light_manager(mut self) -> Self {
        self.root.add_object(ObjectDesc::new("LightManager"));
        self
    }

    /// Add a directional light shining along `direction`
    pub fn add_directional_light(mut self, direction: [f64; 3]) -> Self {
        self.root
            .add_object(ObjectDesc::new("DirectionalLight").with("direction", direction));
        self
    }

    pub fn add_camera(mut self, camera: &InteractiveCamera) -> Self {
        self.root.add_object(ObjectDesc::from(camera));
        self
    }

    /// Add a child node that loads an OBJ file and displays it
    ///
    /// The node holds a `MeshObjLoader` named `loader_name` and an `OglModel`
    /// linked to it.
    pub fn add_mesh_model(
        mut self,
        node_name: &str,
        loader_name: &str,
        mesh_path: &str,
        color: &str,
    ) -> Self {
        self.root
            .add_child(node_name)
            .add_object(
                ObjectDesc::new("MeshObjLoader")
                    .with("name", loader_name)
                    .with("filename", mesh_path),
            )
            .add_object(
                ObjectDesc::new("OglModel")
                    .with("src", format!("@{}", loader_name))
                    .with("color", color),
            );
        self
    }

    /// Build and return the root node
    pub fn build(self) -> Node {
        self.root
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Overhead camera looking down at the origin
pub fn overhead_camera() -> InteractiveCamera {
    InteractiveCamera {
        name: "camera".to_string(),
        position: Some(Vec3::new(0.0, 17.5, 0.0)),
        look_at: Vec3::ZERO,
        distance: 30.0,
        field_of_view: 45.0,
        z_near: 0.63,
        z_far: 55.69,
    }
}

/// The viewer's scene: a white sphere under one light and an overhead camera
pub fn create_scene(mesh_path: &str) -> Node {
    SceneBuilder::new()
        .with_required_plugins(&REQUIRED_PLUGINS)
        .add_light_manager()
        .add_directional_light([0.0, 1.0, 0.0])
        .add_camera(&overhead_camera())
        .add_mesh_model("Sphere", "loader", mesh_path, "white")
        .build()
}
