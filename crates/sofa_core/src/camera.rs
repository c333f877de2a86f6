//! Interactive camera component

use sofa_math::{mat4, Mat4, Vec3};

use crate::{EngineError, ObjectDesc, ParamValue};

/// Camera pose and lens parameters as configured in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveCamera {
    pub name: String,
    /// Eye position; derived from `look_at` and `distance` when absent
    pub position: Option<Vec3>,
    pub look_at: Vec3,
    pub distance: f32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for InteractiveCamera {
    fn default() -> Self {
        Self {
            name: "camera".to_string(),
            position: None,
            look_at: Vec3::ZERO,
            distance: 10.0,
            field_of_view: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl InteractiveCamera {
    /// Build from a component description, falling back to defaults for
    /// parameters that are not given
    pub fn from_desc(desc: &ObjectDesc) -> Result<Self, EngineError> {
        let defaults = Self::default();
        let component = desc.type_name();

        Ok(Self {
            name: desc.name().map(str::to_string).unwrap_or(defaults.name),
            position: optional_vec3(desc, component, "position")?,
            look_at: optional_vec3(desc, component, "lookAt")?.unwrap_or(defaults.look_at),
            distance: optional_f32(desc, component, "distance")?.unwrap_or(defaults.distance),
            field_of_view: optional_f32(desc, component, "fieldOfView")?
                .unwrap_or(defaults.field_of_view),
            z_near: optional_f32(desc, component, "zNear")?.unwrap_or(defaults.z_near),
            z_far: optional_f32(desc, component, "zFar")?.unwrap_or(defaults.z_far),
        })
    }

    /// Resolved eye position
    pub fn eye(&self) -> Vec3 {
        match self.position {
            Some(p) if p != self.look_at => p,
            _ => self.look_at + Vec3::Z * self.distance,
        }
    }

    /// OpenGL-convention modelview matrix for this camera
    ///
    /// World +Y is up unless the camera looks straight along it, in which case
    /// -Z is used so the basis stays well defined.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.eye();
        let forward = (self.look_at - eye).normalized();
        let up = if forward.dot(Vec3::Y).abs() > 0.999 {
            -Vec3::Z
        } else {
            Vec3::Y
        };
        mat4::look_at(eye, self.look_at, up)
    }
}

fn optional_vec3(
    desc: &ObjectDesc,
    component: &str,
    param: &'static str,
) -> Result<Option<Vec3>, EngineError> {
    desc.param(param)
        .map(|v| {
            v.as_vec3().ok_or_else(|| EngineError::InvalidParam {
                component: component.to_string(),
                param,
                expected: "a 3-component vector",
            })
        })
        .transpose()
}

fn optional_f32(
    desc: &ObjectDesc,
    component: &str,
    param: &'static str,
) -> Result<Option<f32>, EngineError> {
    desc.param(param)
        .map(|v| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| EngineError::InvalidParam {
                    component: component.to_string(),
                    param,
                    expected: "a number",
                })
        })
        .transpose()
}

impl From<&InteractiveCamera> for ObjectDesc {
    fn from(camera: &InteractiveCamera) -> Self {
        let vec = |v: Vec3| ParamValue::from([v.x as f64, v.y as f64, v.z as f64]);
        let mut desc = ObjectDesc::new("InteractiveCamera")
            .with("name", camera.name.as_str())
            .with("lookAt", vec(camera.look_at))
            .with("distance", camera.distance as f64)
            .with("fieldOfView", camera.field_of_view as f64)
            .with("zNear", camera.z_near as f64)
            .with("zFar", camera.z_far as f64);
        if let Some(p) = camera.position {
            desc.set("position", vec(p));
        }
        desc
    }
}
