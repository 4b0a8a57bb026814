//! Vertex meshes for shapes that need exact (non-AABB) wall tests
//!
//! Vertices are stored in local space, normalized into `[-0.5, 0.5]` so that
//! an entity's `scale` is its on-screen size. `original_size` keeps the
//! dimensions the asset was authored at.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

use super::transform::Transform;

/// Errors from loading a mesh asset
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("failed to read mesh {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh has no vertices")]
    Empty,
}

/// Vertex of a non-textured mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredVertex {
    pub position: Vec3,
    pub color: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub original_size: Vec2,
    pub vertices: Vec<ColoredVertex>,
    pub vertex_indices: Vec<u16>,
}

impl Mesh {
    /// Read an OBJ file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mesh = Self::from_obj_str(&source)?;
        log::info!(
            "Loaded mesh {} ({} vertices, {} indices)",
            path.display(),
            mesh.vertices.len(),
            mesh.vertex_indices.len()
        );
        Ok(mesh)
    }

    /// Parse the subset of OBJ used by the game assets.
    ///
    /// `v x y z [r g b]` and `f a b c ...` are understood (face tokens may be
    /// `a/b/c`, polygons are fanned into triangles); other records are skipped.
    pub fn from_obj_str(source: &str) -> Result<Self, MeshError> {
        let mut vertices = Vec::new();
        let mut faces: Vec<(usize, Vec<usize>)> = Vec::new();

        for (n, raw) in source.lines().enumerate() {
            let line = n + 1;
            let mut tokens = raw.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let values = tokens
                        .map(|t| parse_f32(t, line))
                        .collect::<Result<Vec<_>, _>>()?;
                    if values.len() < 3 {
                        return Err(MeshError::Parse {
                            line,
                            message: format!("vertex needs 3 coordinates, got {}", values.len()),
                        });
                    }
                    let color = if values.len() >= 6 {
                        Vec3::new(values[3], values[4], values[5])
                    } else {
                        Vec3::ONE
                    };
                    vertices.push(ColoredVertex {
                        position: Vec3::new(values[0], values[1], values[2]),
                        color,
                    });
                }
                Some("f") => {
                    let corners = tokens
                        .map(|t| parse_face_index(t, line))
                        .collect::<Result<Vec<_>, _>>()?;
                    if corners.len() < 3 {
                        return Err(MeshError::Parse {
                            line,
                            message: "face needs at least 3 corners".to_string(),
                        });
                    }
                    faces.push((line, corners));
                }
                _ => {}
            }
        }

        if vertices.is_empty() {
            return Err(MeshError::Empty);
        }

        let mut vertex_indices = Vec::new();
        for (line, corners) in faces {
            for &c in &corners {
                if c >= vertices.len() || c > u16::MAX as usize {
                    return Err(MeshError::Parse {
                        line,
                        message: format!("face index {} out of range", c + 1),
                    });
                }
            }
            for i in 1..corners.len() - 1 {
                vertex_indices.extend([corners[0], corners[i], corners[i + 1]].map(|c| c as u16));
            }
        }

        let min = vertices
            .iter()
            .fold(Vec3::splat(f32::MAX), |acc, v| acc.min(v.position));
        let max = vertices
            .iter()
            .fold(Vec3::splat(f32::MIN), |acc, v| acc.max(v.position));
        let size = max - min;
        // Flat axes (z for 2D assets) collapse to 0 instead of dividing by zero
        let inv = Vec3::select(size.cmpgt(Vec3::ZERO), Vec3::ONE / size, Vec3::ZERO);
        for v in &mut vertices {
            let normalized = (v.position - min) * inv;
            v.position = Vec3::select(size.cmpgt(Vec3::ZERO), normalized - 0.5, Vec3::ZERO);
        }

        Ok(Self {
            original_size: Vec2::new(size.x, size.y),
            vertices,
            vertex_indices,
        })
    }

    /// Convex regular polygon inscribed in the unit box, as a triangle fan
    pub fn regular_polygon(sides: usize, original_size: Vec2, color: Vec3) -> Self {
        let sides = sides.max(3);
        let mut vertices = Vec::with_capacity(sides + 1);
        vertices.push(ColoredVertex {
            position: Vec3::ZERO,
            color,
        });
        for i in 0..sides {
            let theta = std::f32::consts::TAU * i as f32 / sides as f32;
            vertices.push(ColoredVertex {
                position: Vec3::new(0.5 * theta.cos(), 0.5 * theta.sin(), 0.0),
                color,
            });
        }
        let mut vertex_indices = Vec::with_capacity(sides * 3);
        for i in 0..sides {
            let a = 1 + i as u16;
            let b = 1 + ((i + 1) % sides) as u16;
            vertex_indices.extend([0, a, b]);
        }
        Self {
            original_size,
            vertices,
            vertex_indices,
        }
    }

    /// Vertex positions in world space for an object with the given transform
    pub fn world_vertices(&self, transform: &Transform) -> impl Iterator<Item = Vec2> + '_ {
        let transform = *transform;
        self.vertices
            .iter()
            .map(move |v| transform.apply(v.position.truncate()))
    }
}

fn parse_f32(token: &str, line: usize) -> Result<f32, MeshError> {
    token.parse::<f32>().map_err(|_| MeshError::Parse {
        line,
        message: format!("bad number {token:?}"),
    })
}

/// 1-based `a`, `a/b`, `a//c` or `a/b/c` -> 0-based vertex index
fn parse_face_index(token: &str, line: usize) -> Result<usize, MeshError> {
    let first = token.split('/').next().unwrap_or(token);
    match first.parse::<usize>() {
        Ok(i) if i >= 1 => Ok(i - 1),
        _ => Err(MeshError::Parse {
            line,
            message: format!("bad face index {token:?}"),
        }),
    }
}
