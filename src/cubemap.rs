//! Cube-map asset convention and backdrop mesh construction.
//!
//! Skybox assets are six face images named `posx, negx, posy, negy, posz,
//! negz`, each suffixed with the caller-provided extension (dot included),
//! living under a common base path. Face decoding runs on worker threads;
//! only the resulting RGBA8 data crosses back to the render thread.

use std::path::{Path, PathBuf};

use crate::loader::LoadError;
use crate::scene::{CubeFace, CubeMapData, CubeMesh, TextureSampling};

/// Face names in `+x, -x, +y, -y, +z, -z` order. The on-disk convention is
/// bit-exact: `{name}{extension}` under the base path.
pub const CUBE_FACE_NAMES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

/// Resolve the six face file paths for a base path and extension.
pub fn face_paths(base_path: &str, extension: &str) -> [PathBuf; 6] {
  CUBE_FACE_NAMES.map(|name| Path::new(base_path).join(format!("{name}{extension}")))
}

fn load_face(path: &Path) -> Result<CubeFace, LoadError> {
  let img = image::open(path)
    .map_err(|source| LoadError::Image {
      path: path.display().to_string(),
      source,
    })?
    .to_rgba8();

  Ok(CubeFace {
    width: img.width(),
    height: img.height(),
    rgba: img.into_raw(),
  })
}

/// Decode all six faces of a cube map.
///
/// Fails on the first missing or undecodable face; the caller leaves the
/// current backdrop in place in that case.
pub fn load_cube_map(
  base_path: &str,
  extension: &str,
  sampling: TextureSampling,
) -> Result<CubeMapData, LoadError> {
  let [posx, negx, posy, negy, posz, negz] = face_paths(base_path, extension);

  Ok(CubeMapData {
    faces: [
      load_face(&posx)?,
      load_face(&negx)?,
      load_face(&posy)?,
      load_face(&negy)?,
      load_face(&posz)?,
      load_face(&negz)?,
    ],
    sampling,
  })
}

/// Corner positions of a unit cube, shared by all six quads.
const CUBE_CORNERS: [[f32; 3]; 8] = [
  [-1.0, 1.0, 1.0],
  [-1.0, -1.0, 1.0],
  [1.0, -1.0, 1.0],
  [1.0, 1.0, 1.0],
  [-1.0, 1.0, -1.0],
  [-1.0, -1.0, -1.0],
  [1.0, -1.0, -1.0],
  [1.0, 1.0, -1.0],
];

/// Quad corner indices per face.
const CUBE_QUADS: [[u32; 4]; 6] = [
  [0, 1, 2, 3],
  [3, 2, 6, 7],
  [7, 6, 5, 4],
  [4, 5, 1, 0],
  [0, 3, 7, 4],
  [1, 5, 6, 2],
];

/// Build the inward-facing backdrop cube.
///
/// Corners are negated and scaled by `depth` so faces point toward the
/// viewer at the origin. Positions double as cube-map direction UVs, which
/// is why they stay unnormalized.
pub fn build_cube_mesh(depth: f32) -> CubeMesh {
  let positions = CUBE_CORNERS
    .iter()
    .map(|c| [-depth * c[0], -depth * c[1], -depth * c[2]])
    .collect();

  let mut indices = Vec::with_capacity(CUBE_QUADS.len() * 6);
  for [a, b, c, d] in CUBE_QUADS {
    indices.extend_from_slice(&[a, b, c, a, c, d]);
  }

  CubeMesh { positions, indices }
}

#[cfg(test)]
#[path = "cubemap_test.rs"]
mod cubemap_test;
