//! Wavefront OBJ parsing
//!
//! Only geometry is read: `v` positions and `f` faces. Texture coordinates,
//! file normals, groups and materials are skipped; normals are recomputed from
//! the faces.

use std::fmt;

use sofa_math::Vec3;

use crate::TriangleMesh;

/// OBJ parse error
#[derive(Debug, Clone, PartialEq)]
pub enum ObjError {
    /// Malformed statement on a 1-based line
    Parse { line: usize, message: String },
    /// The file parsed but declares no faces
    NoFaces,
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjError::Parse { line, message } => write!(f, "OBJ line {}: {}", line, message),
            ObjError::NoFaces => write!(f, "OBJ contains no faces"),
        }
    }
}

impl std::error::Error for ObjError {}

/// Parse OBJ text into a triangle mesh
///
/// Polygons with more than three corners are fan-triangulated around their
/// first corner.
pub fn parse_obj(source: &str) -> Result<TriangleMesh, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (i, raw) in source.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let coords = parts
                    .take(3)
                    .map(|s| s.parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| parse_error(line_no, format!("bad vertex coordinate: {}", e)))?;
                if coords.len() != 3 {
                    return Err(parse_error(line_no, "vertex needs three coordinates"));
                }
                positions.push(Vec3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let corners = parts
                    .map(|corner| resolve_index(corner, positions.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least three corners"));
                }
                for k in 1..corners.len() - 1 {
                    indices.extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
                }
            }
            // Empty lines, comments and statements that carry no geometry
            _ => {}
        }
    }

    if indices.is_empty() {
        return Err(ObjError::NoFaces);
    }

    Ok(TriangleMesh::new(positions, indices))
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

/// Turn a face corner (`i`, `i/t`, `i//n`, `i/t/n`) into a zero-based index
///
/// Negative indices count back from the most recently declared vertex.
fn resolve_index(corner: &str, vertex_count: usize, line: usize) -> Result<u32, ObjError> {
    let raw = corner.split('/').next().unwrap_or("");
    let index: i64 = raw
        .parse()
        .map_err(|_| parse_error(line, format!("bad face index '{}'", corner)))?;

    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        vertex_count as i64 + index
    } else {
        return Err(parse_error(line, "face index 0 is invalid"));
    };

    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(parse_error(
            line,
            format!("face index {} out of range ({} vertices)", index, vertex_count),
        ));
    }

    Ok(resolved as u32)
}
