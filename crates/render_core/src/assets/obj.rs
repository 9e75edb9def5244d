//! OBJ file loader for 3D models
//!
//! Reads `v`, `vt`, `vn` and `f` records. Face corners may be `p`, `p/t`,
//! `p//n` or `p/t/n`, with 1-based or negative (relative) indices. Identical
//! corner strings share one vertex and polygons are fan-triangulated. Loaded
//! models are centered and scaled to [`ObjLoader::TARGET_SIZE`], then tangents
//! are generated.

use std::collections::HashMap;
use std::path::Path;

use crate::assets::AssetError;
use crate::render::vertex::Vertex;

/// Below this UV determinant a triangle contributes no tangent
const DEGENERATE_UV_EPSILON: f32 = 1e-8;

/// Vertices and triangle indices ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedModel {
    /// Unique vertices
    pub vertices: Vec<Vertex>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
}

impl LoadedModel {
    /// Number of triangles
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Wavefront OBJ loader
pub struct ObjLoader;

impl ObjLoader {
    /// Largest extent of a loaded model
    pub const TARGET_SIZE: f32 = 2.0;

    /// Load, normalize and generate tangents
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `Parse` for malformed records and
    /// `Invalid` when the file has no faces.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<LoadedModel, AssetError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut model = Self::parse(&source)?;
        normalize_model(&mut model.vertices, Self::TARGET_SIZE);
        generate_tangents(&mut model.vertices, &model.indices);

        log::info!(
            "Loaded model {}: {} vertices, {} triangles",
            path.display(),
            model.vertices.len(),
            model.triangle_count()
        );
        Ok(model)
    }

    /// Parse OBJ text without normalizing or generating tangents
    ///
    /// # Errors
    ///
    /// See [`load_obj`](Self::load_obj).
    pub fn parse(source: &str) -> Result<LoadedModel, AssetError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();
        let mut corner_map: HashMap<&str, u32> = HashMap::new();
        let mut model = LoadedModel::default();

        for (line_index, raw_line) in source.lines().enumerate() {
            let line_number = line_index + 1;
            let line = raw_line.split('#').next().unwrap_or_default().trim();
            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };

            match keyword {
                "v" => positions.push(parse_floats::<3>(parts, line_number, "vertex position")?),
                "vn" => normals.push(parse_floats::<3>(parts, line_number, "vertex normal")?),
                "vt" => tex_coords.push(parse_floats::<2>(parts, line_number, "texture coordinate")?),
                "f" => {
                    let mut face = Vec::new();
                    for corner in parts {
                        let index = match corner_map.get(corner) {
                            Some(&index) => index,
                            None => {
                                let vertex =
                                    parse_corner(corner, &positions, &tex_coords, &normals, line_number)?;
                                let index = u32::try_from(model.vertices.len())
                                    .map_err(|_| AssetError::Invalid("too many vertices".to_string()))?;
                                model.vertices.push(vertex);
                                corner_map.insert(corner, index);
                                index
                            }
                        };
                        face.push(index);
                    }

                    if face.len() < 3 {
                        return Err(AssetError::Parse {
                            line: line_number,
                            message: format!("face has {} corners, need at least 3", face.len()),
                        });
                    }
                    for i in 1..face.len() - 1 {
                        model.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                    }
                }
                // Groups, objects, materials and smoothing are not used
                _ => {}
            }
        }

        if model.indices.is_empty() {
            return Err(AssetError::Invalid("model has no faces".to_string()));
        }
        Ok(model)
    }
}

fn parse_floats<'a, const N: usize>(
    mut parts: impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> Result<[f32; N], AssetError> {
    let mut values = [0.0; N];
    for value in &mut values {
        let token = parts.next().ok_or_else(|| AssetError::Parse {
            line,
            message: format!("{what} needs {N} components"),
        })?;
        *value = token.parse().map_err(|_| AssetError::Parse {
            line,
            message: format!("invalid number '{token}' in {what}"),
        })?;
    }
    Ok(values)
}

/// Resolve a 1-based or negative OBJ index against `len` elements
fn resolve_index(token: &str, len: usize, line: usize, what: &str) -> Result<usize, AssetError> {
    let raw: i64 = token.parse().map_err(|_| AssetError::Parse {
        line,
        message: format!("invalid {what} index '{token}'"),
    })?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => usize::try_from(r - 1).ok(),
        r => usize::try_from(-r).ok().and_then(|back| len.checked_sub(back)),
    };
    resolved.filter(|&i| i < len).ok_or_else(|| AssetError::Parse {
        line,
        message: format!("{what} index {raw} out of range ({len} defined)"),
    })
}

fn parse_corner(
    corner: &str,
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals: &[[f32; 3]],
    line: usize,
) -> Result<Vertex, AssetError> {
    let mut fields = corner.split('/');
    let position_token = fields.next().unwrap_or_default();
    let position = positions[resolve_index(position_token, positions.len(), line, "position")?];

    let tex_coord = match fields.next() {
        Some(token) if !token.is_empty() => tex_coords[resolve_index(token, tex_coords.len(), line, "texture")?],
        _ => [0.0; 2],
    };
    let normal = match fields.next() {
        Some(token) if !token.is_empty() => normals[resolve_index(token, normals.len(), line, "normal")?],
        _ => [0.0; 3],
    };

    Ok(Vertex::new(position, normal, tex_coord))
}

/// Center on the origin and scale so the largest extent is `target_size`
///
/// A model with zero extent is left unchanged.
pub fn normalize_model(vertices: &mut [Vertex], target_size: f32) {
    if vertices.is_empty() {
        return;
    }

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for vertex in vertices.iter() {
        for axis in 0..3 {
            min[axis] = min[axis].min(vertex.position[axis]);
            max[axis] = max[axis].max(vertex.position[axis]);
        }
    }

    let center: [f32; 3] = std::array::from_fn(|axis| (min[axis] + max[axis]) * 0.5);
    let max_extent = (0..3).map(|axis| max[axis] - min[axis]).fold(0.0_f32, f32::max);
    if max_extent == 0.0 {
        return;
    }

    let scale = target_size / max_extent;
    for vertex in vertices.iter_mut() {
        for axis in 0..3 {
            vertex.position[axis] = (vertex.position[axis] - center[axis]) * scale;
        }
    }
}

/// Per-vertex tangents accumulated from each triangle's UV mapping
///
/// Triangles whose UV determinant is below 1e-8 in magnitude contribute
/// nothing; vertices that end up with no tangent get `(1, 0, 0)`.
pub fn generate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![[0.0_f32; 3]; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let Some(tangent) = triangle_tangent(&vertices[i0], &vertices[i1], &vertices[i2]) else {
            continue;
        };
        for index in [i0, i1, i2] {
            for axis in 0..3 {
                accumulated[index][axis] += tangent[axis];
            }
        }
    }

    for (vertex, tangent) in vertices.iter_mut().zip(accumulated) {
        let length = tangent.iter().map(|c| c * c).sum::<f32>().sqrt();
        vertex.tangent = if length > 0.0 {
            tangent.map(|c| c / length)
        } else {
            [1.0, 0.0, 0.0]
        };
    }
}

fn triangle_tangent(v0: &Vertex, v1: &Vertex, v2: &Vertex) -> Option<[f32; 3]> {
    let edge1: [f32; 3] = std::array::from_fn(|axis| v1.position[axis] - v0.position[axis]);
    let edge2: [f32; 3] = std::array::from_fn(|axis| v2.position[axis] - v0.position[axis]);
    let duv1 = [v1.tex_coord[0] - v0.tex_coord[0], v1.tex_coord[1] - v0.tex_coord[1]];
    let duv2 = [v2.tex_coord[0] - v0.tex_coord[0], v2.tex_coord[1] - v0.tex_coord[1]];

    let det = duv1[0] * duv2[1] - duv2[0] * duv1[1];
    if det.abs() < DEGENERATE_UV_EPSILON {
        return None;
    }
    let f = 1.0 / det;
    Some(std::array::from_fn(|axis| f * (duv2[1] * edge1[axis] - duv1[1] * edge2[axis])))
}
