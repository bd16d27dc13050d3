//! Scene-graph seam - trait interface to the host engine.
//!
//! The plugin never owns GPU objects or engine node types. Everything it
//! needs from the renderer goes through [`SceneGraph`]: node creation,
//! parent/child attachment, visibility toggling, transforms, and tint
//! colors, plus instantiation of subtrees built off-thread (models, cube
//! meshes, beams). Hosts implement this once per engine bridge.
//!
//! All `SceneGraph` calls must happen on the render thread. Worker threads
//! only ever produce the plain data types in this module ([`ModelData`],
//! [`CubeMesh`], [`CubeMapData`]); the render thread turns them into live
//! nodes.

use glam::{Mat4, Vec4};

/// RGBA color used for tints and pointer/beam materials.
pub type Color = Vec4;

/// Opaque handle to a node owned by the host scene graph.
///
/// Identity only - the plugin never dereferences it. Hosts map it to their
/// own node storage (entity id, slotmap key, pointer table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Texture sampling parameters for cube maps.
///
/// Matches the fixed parameters the backdrop expects: linear mag/min
/// filtering and clamp-to-edge on all three axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSampling {
  pub linear_filter: bool,
  pub clamp_to_edge: bool,
}

impl Default for TextureSampling {
  fn default() -> Self {
    Self {
      linear_filter: true,
      clamp_to_edge: true,
    }
  }
}

/// One cube-map face decoded to tightly packed RGBA8.
#[derive(Clone)]
pub struct CubeFace {
  pub width: u32,
  pub height: u32,
  pub rgba: Vec<u8>,
}

impl std::fmt::Debug for CubeFace {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "CubeFace({}x{} rgba)", self.width, self.height)
  }
}

/// Six decoded faces in `+x, -x, +y, -y, +z, -z` order.
#[derive(Clone, Debug)]
pub struct CubeMapData {
  pub faces: [CubeFace; 6],
  pub sampling: TextureSampling,
}

/// Inward-facing cube mesh for the geometry backdrop.
///
/// Positions double as cube-map direction UVs, so no separate UV channel is
/// carried. Indices are triangles (three per entry group).
#[derive(Clone, Debug)]
pub struct CubeMesh {
  pub positions: Vec<[f32; 3]>,
  pub indices: Vec<u32>,
}

impl CubeMesh {
  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

/// Raw model file contents read on a worker thread.
///
/// Parsing and GPU compilation are the host's concern; the plugin only
/// moves the bytes off the render thread.
pub struct ModelData {
  pub file_name: String,
  pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ModelData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ModelData")
      .field("file_name", &self.file_name)
      .field("len", &self.bytes.len())
      .finish()
  }
}

/// Node primitives consumed from the host scene graph.
///
/// Implementations may assume single-threaded access from the render
/// thread. Structural methods (`add_child`, `remove_child`,
/// `clear_children`) must take effect before the next frame traversal.
pub trait SceneGraph {
  /// Create a visibility-toggle node.
  fn create_toggle(&mut self) -> NodeId;

  /// Create a transform node with identity transform.
  fn create_transform(&mut self) -> NodeId;

  /// Attach `child` under `parent`.
  fn add_child(&mut self, parent: NodeId, child: NodeId);

  /// Detach `child` from `parent`, releasing the parent-to-child edge.
  fn remove_child(&mut self, parent: NodeId, child: NodeId);

  /// Detach every child of `parent`. The parent node itself survives.
  fn clear_children(&mut self, parent: NodeId);

  /// Toggle visibility of `node` and its subtree.
  fn set_visible(&mut self, node: NodeId, visible: bool);

  /// Overwrite the transform of a transform node.
  fn set_transform(&mut self, node: NodeId, transform: Mat4);

  /// Apply a tint color to the node's material, if it has one.
  fn set_tint(&mut self, node: NodeId, color: Color);

  /// Parse/compile a loaded model and attach it under `parent`.
  /// Returns the root node of the instantiated model.
  fn build_model(&mut self, parent: NodeId, model: &ModelData) -> NodeId;

  /// Upload a cube mesh plus cube texture and attach it under `parent`.
  fn build_cube_mesh(&mut self, parent: NodeId, mesh: &CubeMesh, faces: &CubeMapData) -> NodeId;

  /// Build the default beam/ray visual under `parent`.
  fn build_beam(&mut self, parent: NodeId) -> NodeId;

  /// Create a scene node presenting the compositor cube layer.
  fn create_layer_node(&mut self) -> NodeId;
}

/// Compositor-owned cube layer (skybox only).
///
/// The compositor manages the GPU surface; the plugin only reacts to its
/// texture handle becoming available and hands it decoded faces to bind.
pub trait CubeLayer {
  /// Current GPU texture handle, `None` until the surface exists.
  fn texture_handle(&self) -> Option<u32>;

  /// Bind the decoded cube-map faces to the layer's texture.
  fn bind_cube_map(&mut self, faces: &CubeMapData);

  /// Mark the layer content as loaded/presentable.
  fn set_loaded(&mut self, loaded: bool);

  /// Apply a tint to the composited layer.
  fn set_tint(&mut self, color: Color);
}
