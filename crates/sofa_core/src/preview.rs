//! Preview engine
//!
//! An in-process [`SimulationEngine`] that understands the visual side of a
//! scene: lights, the interactive camera, OBJ mesh loaders and the models
//! displaying them. Stepping advances the clock only; there is no solver, so
//! scenes without mechanical objects (which is all it accepts) behave exactly
//! as they would in the full engine.

use std::collections::HashMap;
use std::path::PathBuf;

use slotmap::SlotMap;
use sofa_math::Mat4;

use crate::{
    parse_color, parse_obj, DirectionalLight, DrawTarget, EngineError, InteractiveCamera, Node,
    ObjectDesc, PluginRepository, SimulationEngine, TriangleMesh, VisualKey, VisualModel,
};

/// Preview engine settings
#[derive(Debug, Clone)]
pub struct PreviewSettings {
    /// Timestep reported by [`SimulationEngine::dt`]
    pub dt: f64,
    /// Fail on plugins that cannot be located (otherwise warn)
    pub verify_plugins: bool,
    /// Directory mesh filenames are resolved against
    pub asset_root: PathBuf,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            dt: 0.01,
            verify_plugins: true,
            asset_root: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Empty,
    Loaded,
    Initialized,
}

/// A plugin that was requested, and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRecord {
    pub name: String,
    pub path: Option<PathBuf>,
}

/// Meshes created by loaders, addressable by name within a node scope
#[derive(Default)]
struct LoaderScopes {
    meshes: Vec<TriangleMesh>,
    scopes: Vec<HashMap<String, usize>>,
}

impl LoaderScopes {
    fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn insert(&mut self, name: String, mesh: TriangleMesh) {
        self.meshes.push(mesh);
        let index = self.meshes.len() - 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, index);
        }
    }

    /// Innermost scope first, then ancestors
    fn resolve(&self, name: &str) -> Option<&TriangleMesh> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .map(|&i| &self.meshes[i])
    }
}

/// In-process engine for previewing visual scenes
pub struct PreviewEngine {
    settings: PreviewSettings,
    repository: PluginRepository,
    plugins: Vec<PluginRecord>,
    state: EngineState,
    time: f64,
    light_manager: bool,
    lights: Vec<DirectionalLight>,
    camera: Option<InteractiveCamera>,
    visuals: SlotMap<VisualKey, VisualModel>,
    visuals_ready: bool,
}

impl PreviewEngine {
    pub fn new(settings: PreviewSettings, repository: PluginRepository) -> Self {
        Self {
            settings,
            repository,
            plugins: Vec::new(),
            state: EngineState::Empty,
            time: 0.0,
            light_manager: false,
            lights: Vec::new(),
            camera: None,
            visuals: SlotMap::with_key(),
            visuals_ready: false,
        }
    }

    /// Simulated time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }

    pub fn camera(&self) -> Option<&InteractiveCamera> {
        self.camera.as_ref()
    }

    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    fn require_plugin(&mut self, name: &str) -> Result<(), EngineError> {
        if self.plugins.iter().any(|p| p.name == name) {
            return Ok(());
        }

        let path = self.repository.locate(name);
        match &path {
            Some(p) => log::debug!("Plugin {} found at {}", name, p.display()),
            None if self.settings.verify_plugins => {
                return Err(EngineError::PluginNotFound {
                    name: name.to_string(),
                    searched: self.repository.paths().to_vec(),
                });
            }
            None => log::warn!("Plugin {} not found, continuing without it", name),
        }

        self.plugins.push(PluginRecord {
            name: name.to_string(),
            path,
        });
        Ok(())
    }

    fn instantiate_node(&mut self, node: &Node, loaders: &mut LoaderScopes) -> Result<(), EngineError> {
        loaders.push();
        for object in node.objects() {
            self.instantiate_object(node, object, loaders)?;
        }
        for child in node.children() {
            self.instantiate_node(child, loaders)?;
        }
        loaders.pop();
        Ok(())
    }

    fn instantiate_object(
        &mut self,
        node: &Node,
        object: &ObjectDesc,
        loaders: &mut LoaderScopes,
    ) -> Result<(), EngineError> {
        let component = object.type_name();
        log::trace!("{}: creating {}", node.name(), component);

        match component {
            "RequiredPlugin" => {
                let name = required_text(object, "name")?;
                self.require_plugin(name)
            }
            "LightManager" => {
                self.light_manager = true;
                Ok(())
            }
            "DirectionalLight" => {
                let mut light = DirectionalLight::default();
                if let Some(value) = object.param("direction") {
                    light.direction = value.as_vec3().ok_or_else(|| invalid(object, "direction", "a 3-component vector"))?;
                }
                if let Some(value) = object.param("color") {
                    let c = parse_color(value).ok_or_else(|| invalid(object, "color", "a colour"))?;
                    light.color = [c[0], c[1], c[2]];
                }
                self.lights.push(light);
                Ok(())
            }
            "InteractiveCamera" => {
                if self.camera.is_some() {
                    log::warn!("{}: scene already has a camera, replacing it", node.name());
                }
                self.camera = Some(InteractiveCamera::from_desc(object)?);
                Ok(())
            }
            "MeshObjLoader" => {
                let filename = required_text(object, "filename")?;
                let path = self.settings.asset_root.join(filename);
                let source = std::fs::read_to_string(&path).map_err(|source| EngineError::Io {
                    path: path.clone(),
                    source,
                })?;
                let mesh = parse_obj(&source).map_err(|source| EngineError::Mesh {
                    path: path.clone(),
                    source,
                })?;
                log::info!(
                    "Loaded mesh {} ({} vertices, {} triangles)",
                    path.display(),
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
                let name = object.name().unwrap_or(component).to_string();
                loaders.insert(name, mesh);
                Ok(())
            }
            "OglModel" => {
                let link = object
                    .param("src")
                    .ok_or_else(|| EngineError::MissingParam {
                        component: component.to_string(),
                        param: "src",
                    })?
                    .as_link()
                    .ok_or_else(|| invalid(object, "src", "a link (@name)"))?;
                let mesh = loaders
                    .resolve(link)
                    .ok_or_else(|| EngineError::UnresolvedLink {
                        component: component.to_string(),
                        link: link.to_string(),
                    })?
                    .clone();
                let color = match object.param("color") {
                    Some(value) => parse_color(value).ok_or_else(|| invalid(object, "color", "a colour"))?,
                    None => [1.0, 1.0, 1.0, 1.0],
                };
                let name = object.name().unwrap_or(node.name()).to_string();
                self.visuals.insert(VisualModel {
                    name,
                    mesh,
                    color,
                    revision: 0,
                });
                Ok(())
            }
            _ => Err(EngineError::UnknownComponent {
                type_name: component.to_string(),
                node: node.name().to_string(),
            }),
        }
    }

    fn ensure_initialized(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Initialized => Ok(()),
            EngineState::Loaded => Err(EngineError::NotInitialized),
            EngineState::Empty => Err(EngineError::NotLoaded),
        }
    }
}

impl SimulationEngine for PreviewEngine {
    fn name(&self) -> &str {
        "preview"
    }

    fn import_plugin(&mut self, name: &str) -> Result<(), EngineError> {
        self.require_plugin(name)
    }

    fn load(&mut self, root: Node) -> Result<(), EngineError> {
        if self.state != EngineState::Empty {
            return Err(EngineError::AlreadyLoaded);
        }

        let mut loaders = LoaderScopes::default();
        self.instantiate_node(&root, &mut loaders)?;

        log::info!(
            "Scene '{}' loaded: {} objects, {} plugins, {} visual models",
            root.name(),
            root.object_count_recursive(),
            self.plugins.len(),
            self.visuals.len()
        );

        self.state = EngineState::Loaded;
        Ok(())
    }

    fn init(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Empty => Err(EngineError::NotLoaded),
            EngineState::Loaded | EngineState::Initialized => {
                self.state = EngineState::Initialized;
                self.time = 0.0;
                Ok(())
            }
        }
    }

    fn dt(&self) -> f64 {
        self.settings.dt
    }

    fn animate(&mut self, dt: f64) -> Result<(), EngineError> {
        self.ensure_initialized()?;
        self.time += dt;
        log::trace!("t = {:.3}", self.time);
        Ok(())
    }

    fn update_visual(&mut self) -> Result<(), EngineError> {
        // Nothing moves without mechanical objects
        self.ensure_initialized()
    }

    fn init_visual(&mut self) -> Result<(), EngineError> {
        self.ensure_initialized()?;
        for visual in self.visuals.values_mut() {
            visual.mesh.compute_normals();
            visual.revision += 1;
        }
        self.visuals_ready = true;
        Ok(())
    }

    fn camera_view_matrix(&self) -> Option<Mat4> {
        self.camera.as_ref().map(InteractiveCamera::view_matrix)
    }

    fn draw(&self, target: &mut dyn DrawTarget) {
        if !self.visuals_ready {
            log::trace!("draw skipped, visuals not initialized");
            return;
        }
        // Lights only take effect under a LightManager
        if self.light_manager {
            target.set_lights(&self.lights);
        }
        for (key, visual) in self.visuals.iter() {
            target.draw_visual(key, visual);
        }
    }
}

fn required_text<'a>(object: &'a ObjectDesc, param: &'static str) -> Result<&'a str, EngineError> {
    object
        .param(param)
        .ok_or_else(|| EngineError::MissingParam {
            component: object.type_name().to_string(),
            param,
        })?
        .as_str()
        .ok_or_else(|| invalid(object, param, "text"))
}

fn invalid(object: &ObjectDesc, param: &'static str, expected: &'static str) -> EngineError {
    EngineError::InvalidParam {
        component: object.type_name().to_string(),
        param,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sofa_math::Vec3;
    use std::fs;
    use std::path::Path;

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn asset_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sofa_preview_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("mesh")).unwrap();
        fs::write(dir.join("mesh/tri.obj"), TRIANGLE_OBJ).unwrap();
        dir
    }

    fn engine(asset_root: &Path) -> PreviewEngine {
        PreviewEngine::new(
            PreviewSettings {
                dt: 0.01,
                verify_plugins: false,
                asset_root: asset_root.to_path_buf(),
            },
            PluginRepository::new(),
        )
    }

    fn mesh_scene() -> Node {
        let mut root = Node::new("root");
        root.add_object(ObjectDesc::new("LightManager"))
            .add_object(ObjectDesc::new("DirectionalLight").with("direction", [0.0, 1.0, 0.0]))
            .add_object(
                ObjectDesc::new("InteractiveCamera")
                    .with("name", "camera")
                    .with("position", [0.0, 17.5, 0.0])
                    .with("lookAt", [0.0, 0.0, 0.0]),
            );
        root.add_child("Tri")
            .add_object(
                ObjectDesc::new("MeshObjLoader")
                    .with("name", "loader")
                    .with("filename", "mesh/tri.obj"),
            )
            .add_object(ObjectDesc::new("OglModel").with("src", "@loader").with("color", "white"));
        root
    }

    #[derive(Default)]
    struct NamingTarget {
        names: Vec<String>,
    }

    impl DrawTarget for NamingTarget {
        fn set_lights(&mut self, _lights: &[DirectionalLight]) {}

        fn draw_visual(&mut self, _key: VisualKey, visual: &VisualModel) {
            self.names.push(visual.name.clone());
        }
    }

    #[derive(Default)]
    struct CountingTarget {
        lights_set: bool,
        lights: usize,
        visuals: Vec<(VisualKey, u64, [f32; 4])>,
    }

    impl DrawTarget for CountingTarget {
        fn set_lights(&mut self, lights: &[DirectionalLight]) {
            self.lights_set = true;
            self.lights = lights.len();
        }

        fn draw_visual(&mut self, key: VisualKey, visual: &VisualModel) {
            self.visuals.push((key, visual.revision, visual.color));
        }
    }

    #[test]
    fn test_load_mesh_scene() {
        let dir = asset_dir("load");
        let mut engine = engine(&dir);
        engine.load(mesh_scene()).unwrap();

        assert_eq!(engine.lights().len(), 1);
        assert_eq!(engine.lights()[0].direction, Vec3::Y);
        assert_eq!(engine.visual_count(), 1);
        assert_eq!(engine.camera().unwrap().position, Some(Vec3::new(0.0, 17.5, 0.0)));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_lifecycle_order_enforced() {
        let dir = asset_dir("lifecycle");
        let mut engine = engine(&dir);

        assert!(matches!(engine.init(), Err(EngineError::NotLoaded)));
        assert!(matches!(engine.animate(0.01), Err(EngineError::NotLoaded)));

        engine.load(mesh_scene()).unwrap();
        assert!(matches!(engine.animate(0.01), Err(EngineError::NotInitialized)));
        assert!(matches!(engine.load(Node::new("again")), Err(EngineError::AlreadyLoaded)));

        engine.init().unwrap();
        engine.animate(engine.dt()).unwrap();
        engine.animate(engine.dt()).unwrap();
        engine.update_visual().unwrap();
        assert!((engine.time() - 0.02).abs() < 1e-12);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_draw_requires_init_visual() {
        let dir = asset_dir("draw");
        let mut engine = engine(&dir);
        engine.load(mesh_scene()).unwrap();
        engine.init().unwrap();

        let mut before = CountingTarget::default();
        engine.draw(&mut before);
        assert!(before.visuals.is_empty());

        engine.init_visual().unwrap();
        let mut after = CountingTarget::default();
        engine.draw(&mut after);
        assert!(after.lights_set);
        assert_eq!(after.lights, 1);
        assert_eq!(after.visuals.len(), 1);
        assert_eq!(after.visuals[0].1, 1);
        assert_eq!(after.visuals[0].2, [1.0, 1.0, 1.0, 1.0]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_camera_matrix() {
        let dir = asset_dir("camera");
        let mut engine = engine(&dir);
        assert!(engine.camera_view_matrix().is_none());

        engine.load(mesh_scene()).unwrap();
        let view = engine.camera_view_matrix().unwrap();
        // Translation column carries the eye distance along -Z
        assert!((view[3][2] + 17.5).abs() < 1e-4);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_component() {
        let dir = asset_dir("unknown");
        let mut engine = engine(&dir);
        let mut root = Node::new("root");
        root.add_object(ObjectDesc::new("EulerImplicitSolver"));

        match engine.load(root) {
            Err(EngineError::UnknownComponent { type_name, node }) => {
                assert_eq!(type_name, "EulerImplicitSolver");
                assert_eq!(node, "root");
            }
            other => panic!("expected UnknownComponent, got {:?}", other),
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unresolved_link() {
        let dir = asset_dir("link");
        let mut engine = engine(&dir);
        let mut root = Node::new("root");
        root.add_child("A").add_object(
            ObjectDesc::new("MeshObjLoader")
                .with("name", "loader")
                .with("filename", "mesh/tri.obj"),
        );
        // Sibling scopes do not see each other's loaders
        root.add_child("B")
            .add_object(ObjectDesc::new("OglModel").with("src", "@loader"));

        assert!(matches!(
            engine.load(root),
            Err(EngineError::UnresolvedLink { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_link_resolves_from_ancestor() {
        let dir = asset_dir("ancestor");
        let mut engine = engine(&dir);
        let mut root = Node::new("root");
        root.add_object(
            ObjectDesc::new("MeshObjLoader")
                .with("name", "shared")
                .with("filename", "mesh/tri.obj"),
        );
        root.add_child("Visual")
            .add_object(ObjectDesc::new("OglModel").with("src", "@shared"));

        engine.load(root).unwrap();
        assert_eq!(engine.visual_count(), 1);
        engine.init().unwrap();
        engine.init_visual().unwrap();
        let mut target = NamingTarget::default();
        engine.draw(&mut target);
        assert_eq!(target.names, vec!["Visual"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_mesh_file() {
        let dir = asset_dir("missing");
        let mut engine = engine(&dir);
        let mut root = Node::new("root");
        root.add_object(ObjectDesc::new("MeshObjLoader").with("filename", "mesh/nope.obj"));

        assert!(matches!(engine.load(root), Err(EngineError::Io { .. })));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_filename_param() {
        let dir = asset_dir("param");
        let mut engine = engine(&dir);
        let mut root = Node::new("root");
        root.add_object(ObjectDesc::new("MeshObjLoader").with("name", "loader"));

        assert!(matches!(
            engine.load(root),
            Err(EngineError::MissingParam { param: "filename", .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_plugin_verification() {
        let dir = asset_dir("plugins");
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(dir.join("bin/libSofa.Component.Visual.so"), b"").unwrap();

        let mut repository = PluginRepository::new();
        repository.add_first_path(dir.join("bin"));
        let mut strict = PreviewEngine::new(PreviewSettings::default(), repository.clone());

        strict.import_plugin("Sofa.Component.Visual").unwrap();
        strict.import_plugin("Sofa.Component.Visual").unwrap();
        assert_eq!(strict.plugins().len(), 1);
        assert!(strict.plugins()[0].path.is_some());

        assert!(matches!(
            strict.import_plugin("SofaHaptics"),
            Err(EngineError::PluginNotFound { .. })
        ));

        let mut lenient = PreviewEngine::new(
            PreviewSettings {
                verify_plugins: false,
                ..PreviewSettings::default()
            },
            repository,
        );
        lenient.import_plugin("SofaHaptics").unwrap();
        assert_eq!(lenient.plugins()[0].path, None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_lights_need_light_manager() {
        let dir = asset_dir("no_manager");
        let mut engine = engine(&dir);
        let mut root = Node::new("root");
        root.add_object(ObjectDesc::new("DirectionalLight").with("direction", [0.0, 1.0, 0.0]));
        root.add_child("Tri")
            .add_object(
                ObjectDesc::new("MeshObjLoader")
                    .with("name", "loader")
                    .with("filename", "mesh/tri.obj"),
            )
            .add_object(ObjectDesc::new("OglModel").with("src", "@loader"));

        engine.load(root).unwrap();
        engine.init().unwrap();
        engine.init_visual().unwrap();

        let mut target = CountingTarget::default();
        engine.draw(&mut target);
        assert!(!target.lights_set);
        assert_eq!(target.visuals.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }
}
