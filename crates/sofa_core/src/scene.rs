//! Scene description
//!
//! A [`Node`] tree describes what the engine should build. Nothing here is
//! live simulation state: the tree is handed to a
//! [`SimulationEngine`](crate::SimulationEngine), which owns it from then on.

use std::collections::BTreeMap;

use crate::ParamValue;

/// A component to instantiate, addressed by its factory type name
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDesc {
    type_name: String,
    params: BTreeMap<String, ParamValue>,
}

impl ObjectDesc {
    /// Create a description with no parameters
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set (or replace) a parameter
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Iterate parameters in key order
    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `name` parameter, if set as text
    pub fn name(&self) -> Option<&str> {
        self.param("name").and_then(ParamValue::as_str)
    }
}

/// A scene-graph node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    objects: Vec<ObjectDesc>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an object; objects are instantiated in insertion order
    pub fn add_object(&mut self, object: ObjectDesc) -> &mut Self {
        self.objects.push(object);
        self
    }

    /// Append a new empty child and return it for further configuration
    pub fn add_child(&mut self, name: impl Into<String>) -> &mut Node {
        self.children.push(Node::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn objects(&self) -> &[ObjectDesc] {
        &self.objects
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Objects of the given type on this node (not descendants)
    pub fn objects_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a ObjectDesc> {
        self.objects.iter().filter(move |o| o.type_name == type_name)
    }

    /// Total number of objects in this subtree
    pub fn object_count_recursive(&self) -> usize {
        self.objects.len()
            + self
                .children
                .iter()
                .map(Node::object_count_recursive)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_builder() {
        let obj = ObjectDesc::new("MeshObjLoader")
            .with("name", "loader")
            .with("filename", "mesh/sphere.obj");

        assert_eq!(obj.type_name(), "MeshObjLoader");
        assert_eq!(obj.name(), Some("loader"));
        assert_eq!(obj.param("filename").and_then(ParamValue::as_str), Some("mesh/sphere.obj"));
        assert!(obj.param("missing").is_none());
    }

    #[test]
    fn test_set_replaces() {
        let mut obj = ObjectDesc::new("OglModel").with("color", "white");
        obj.set("color", "red");
        assert_eq!(obj.params().count(), 1);
        assert_eq!(obj.param("color"), Some(&ParamValue::Text("red".into())));
    }

    #[test]
    fn test_node_tree() {
        let mut root = Node::new("root");
        root.add_object(ObjectDesc::new("LightManager"));
        let sphere = root.add_child("Sphere");
        sphere
            .add_object(ObjectDesc::new("MeshObjLoader").with("name", "loader"))
            .add_object(ObjectDesc::new("OglModel").with("src", "@loader"));

        assert_eq!(root.objects().len(), 1);
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.object_count_recursive(), 3);

        let sphere = root.child("Sphere").unwrap();
        assert_eq!(sphere.objects_of_type("OglModel").count(), 1);
        assert!(root.child("Cube").is_none());
    }
}
