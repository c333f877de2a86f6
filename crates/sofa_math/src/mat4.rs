//! 4x4 Matrix utilities for viewing transformations
//!
//! Matrices are stored column-major (`m[column][row]`), matching both the
//! OpenGL modelview convention the simulation engine reports its camera in and
//! the layout WGSL expects for `mat4x4<f32>` uniforms.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a homogeneous vector: result = M * v
pub fn transform(m: Mat4, v: [f32; 4]) -> [f32; 4] {
    [
        m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2] + m[3][0] * v[3],
        m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2] + m[3][1] * v[3],
        m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2] + m[3][2] * v[3],
        m[0][3] * v[0] + m[1][3] * v[1] + m[2][3] * v[2] + m[3][3] * v[3],
    ]
}

/// Transform a point (w = 1) and apply the perspective divide
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    let [x, y, z, w] = transform(m, [p.x, p.y, p.z, 1.0]);
    if w != 0.0 && w != 1.0 {
        Vec3::new(x / w, y / w, z / w)
    } else {
        Vec3::new(x, y, z)
    }
}

/// Right-handed look-at view matrix
///
/// The camera looks down its local -Z axis. `up` must not be parallel to the
/// viewing direction; callers pick a fallback when it is.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);

    [
        [s.x, u.x, -f.x, 0.0],
        [s.y, u.y, -f.y, 0.0],
        [s.z, u.z, -f.z, 0.0],
        [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
    ]
}

/// Right-handed perspective projection with a zero-to-one depth range
///
/// Equivalent to `gluPerspective` apart from the depth range.
///
/// # Arguments
/// * `fov_y` - Vertical field of view in radians
/// * `aspect` - Width divided by height
/// * `near`, `far` - Positive distances to the clip planes
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far * nf, -1.0],
        [0.0, 0.0, near * far * nf, 0.0],
    ]
}

/// Right-handed orthographic projection with a zero-to-one depth range
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rl = 1.0 / (right - left);
    let tb = 1.0 / (top - bottom);
    let fn_ = 1.0 / (far - near);

    [
        [2.0 * rl, 0.0, 0.0, 0.0],
        [0.0, 2.0 * tb, 0.0, 0.0],
        [0.0, 0.0, -fn_, 0.0],
        [-(right + left) * rl, -(top + bottom) * tb, -near * fn_, 1.0],
    ]
}

/// 2D orthographic projection (the `gluOrtho2D` equivalent, near -1 far 1)
///
/// Passing `bottom > top` flips the Y axis so pixel rows grow downwards.
pub fn ortho_2d(left: f32, right: f32, bottom: f32, top: f32) -> Mat4 {
    ortho(left, right, bottom, top, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn translate(x: f32, y: f32, z: f32) -> Mat4 {
        let mut m = IDENTITY;
        m[3] = [x, y, z, 1.0];
        m
    }

    #[test]
    fn test_mul_identity() {
        let t = translate(1.0, 2.0, 3.0);
        assert_eq!(mul(IDENTITY, t), t);
        assert_eq!(mul(t, IDENTITY), t);
    }

    #[test]
    fn test_mul_applies_right_operand_first() {
        // Scale by 2 then translate by (1, 0, 0)
        let mut scale = IDENTITY;
        scale[0][0] = 2.0;
        let m = mul(translate(1.0, 0.0, 0.0), scale);
        let p = transform_point(m, Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_vec(p, Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = perspective(45f32.to_radians(), 1920.0 / 1080.0, 0.1, 50.0);
        let near = transform_point(proj, Vec3::new(0.0, 0.0, -0.1));
        let far = transform_point(proj, Vec3::new(0.0, 0.0, -50.0));
        assert!(approx_eq(near.z, 0.0));
        assert!(approx_eq(far.z, 1.0));
    }

    #[test]
    fn test_perspective_fov_edge() {
        // A point on the top edge of the frustum lands on y = 1
        let fov = 45f32.to_radians();
        let proj = perspective(fov, 1.0, 0.1, 50.0);
        let z = -10.0;
        let y = (fov / 2.0).tan() * 10.0;
        let p = transform_point(proj, Vec3::new(0.0, y, z));
        assert!(approx_eq(p.y, 1.0));
    }

    #[test]
    fn test_ortho_2d_flipped_corners() {
        let proj = ortho_2d(0.0, 1920.0, 1080.0, 1.0);
        let top_left = transform_point(proj, Vec3::new(0.0, 1.0, 0.0));
        let bottom_right = transform_point(proj, Vec3::new(1920.0, 1080.0, 0.0));
        assert!(approx_vec(top_left, Vec3::new(-1.0, 1.0, 0.5)));
        assert!(approx_vec(bottom_right, Vec3::new(1.0, -1.0, 0.5)));
    }

    #[test]
    fn test_look_at_moves_target_onto_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let view = look_at(eye, Vec3::ZERO, Vec3::Y);
        let p = transform_point(view, Vec3::ZERO);
        assert!(approx_vec(p, Vec3::new(0.0, 0.0, -10.0)));
        // Eye is at the origin in view space
        let e = transform_point(view, eye);
        assert!(approx_vec(e, Vec3::ZERO));
    }
}
