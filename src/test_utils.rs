//! Shared test fixtures: a recording scene graph and a fake cube layer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use glam::Mat4;

use crate::scene::{Color, CubeLayer, CubeMapData, CubeMesh, ModelData, NodeId, SceneGraph};

/// Every structural or state mutation a test graph observed.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphOp {
  AddChild(NodeId, NodeId),
  RemoveChild(NodeId, NodeId),
  ClearChildren(NodeId),
  SetVisible(NodeId, bool),
  SetTransform(NodeId, Mat4),
  SetTint(NodeId, Color),
  BuildModel { parent: NodeId, file_name: String },
  BuildCubeMesh { parent: NodeId, triangles: usize },
  BuildBeam(NodeId),
  CreateLayerNode(NodeId),
}

/// SceneGraph implementation that records ops and maintains a live
/// parent/child map, so tests can assert both call sequences and final
/// topology.
#[derive(Default)]
pub struct RecordingGraph {
  next_id: u64,
  pub ops: Vec<GraphOp>,
  pub children: HashMap<NodeId, Vec<NodeId>>,
}

impl RecordingGraph {
  pub fn new() -> Self {
    Self::default()
  }

  fn alloc(&mut self) -> NodeId {
    self.next_id += 1;
    NodeId(self.next_id)
  }

  pub fn children_of(&self, parent: NodeId) -> &[NodeId] {
    self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn count_models_built(&self) -> usize {
    self
      .ops
      .iter()
      .filter(|op| matches!(op, GraphOp::BuildModel { .. }))
      .count()
  }

  pub fn count_cube_meshes_built(&self) -> usize {
    self
      .ops
      .iter()
      .filter(|op| matches!(op, GraphOp::BuildCubeMesh { .. }))
      .count()
  }

  pub fn last_visibility(&self, node: NodeId) -> Option<bool> {
    self.ops.iter().rev().find_map(|op| match op {
      GraphOp::SetVisible(n, visible) if *n == node => Some(*visible),
      _ => None,
    })
  }

  pub fn last_transform(&self, node: NodeId) -> Option<Mat4> {
    self.ops.iter().rev().find_map(|op| match op {
      GraphOp::SetTransform(n, transform) if *n == node => Some(*transform),
      _ => None,
    })
  }
}

impl SceneGraph for RecordingGraph {
  fn create_toggle(&mut self) -> NodeId {
    self.alloc()
  }

  fn create_transform(&mut self) -> NodeId {
    self.alloc()
  }

  fn add_child(&mut self, parent: NodeId, child: NodeId) {
    self.children.entry(parent).or_default().push(child);
    self.ops.push(GraphOp::AddChild(parent, child));
  }

  fn remove_child(&mut self, parent: NodeId, child: NodeId) {
    if let Some(children) = self.children.get_mut(&parent) {
      children.retain(|c| *c != child);
    }
    self.ops.push(GraphOp::RemoveChild(parent, child));
  }

  fn clear_children(&mut self, parent: NodeId) {
    self.children.remove(&parent);
    self.ops.push(GraphOp::ClearChildren(parent));
  }

  fn set_visible(&mut self, node: NodeId, visible: bool) {
    self.ops.push(GraphOp::SetVisible(node, visible));
  }

  fn set_transform(&mut self, node: NodeId, transform: Mat4) {
    self.ops.push(GraphOp::SetTransform(node, transform));
  }

  fn set_tint(&mut self, node: NodeId, color: Color) {
    self.ops.push(GraphOp::SetTint(node, color));
  }

  fn build_model(&mut self, parent: NodeId, model: &ModelData) -> NodeId {
    let node = self.alloc();
    self.children.entry(parent).or_default().push(node);
    self.ops.push(GraphOp::BuildModel {
      parent,
      file_name: model.file_name.clone(),
    });
    node
  }

  fn build_cube_mesh(&mut self, parent: NodeId, mesh: &CubeMesh, _faces: &CubeMapData) -> NodeId {
    let node = self.alloc();
    self.children.entry(parent).or_default().push(node);
    self.ops.push(GraphOp::BuildCubeMesh {
      parent,
      triangles: mesh.triangle_count(),
    });
    node
  }

  fn build_beam(&mut self, parent: NodeId) -> NodeId {
    let node = self.alloc();
    self.children.entry(parent).or_default().push(node);
    self.ops.push(GraphOp::BuildBeam(parent));
    node
  }

  fn create_layer_node(&mut self) -> NodeId {
    let node = self.alloc();
    self.ops.push(GraphOp::CreateLayerNode(node));
    node
  }
}

/// Observable state of a [`FakeCubeLayer`], shared with the test body.
#[derive(Default)]
pub struct LayerState {
  pub texture_handle: Option<u32>,
  pub loaded: bool,
  pub bind_count: usize,
  pub tint: Option<Color>,
}

/// CubeLayer fake whose state stays inspectable after the layer moves into
/// a skybox.
#[derive(Clone, Default)]
pub struct FakeCubeLayer {
  pub state: Arc<Mutex<LayerState>>,
}

impl FakeCubeLayer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_texture_handle(&self, handle: Option<u32>) {
    self.state.lock().unwrap().texture_handle = handle;
  }
}

impl CubeLayer for FakeCubeLayer {
  fn texture_handle(&self) -> Option<u32> {
    self.state.lock().unwrap().texture_handle
  }

  fn bind_cube_map(&mut self, _faces: &CubeMapData) {
    self.state.lock().unwrap().bind_count += 1;
  }

  fn set_loaded(&mut self, loaded: bool) {
    self.state.lock().unwrap().loaded = loaded;
  }

  fn set_tint(&mut self, color: Color) {
    self.state.lock().unwrap().tint = Some(color);
  }
}

/// Create a unique scratch directory under the system temp dir.
pub fn scratch_dir(tag: &str) -> PathBuf {
  use std::sync::atomic::{AtomicU64, Ordering};
  static COUNTER: AtomicU64 = AtomicU64::new(0);

  let dir = std::env::temp_dir().join(format!(
    "vr_stage_plugin-{tag}-{}-{}",
    std::process::id(),
    COUNTER.fetch_add(1, Ordering::Relaxed)
  ));
  std::fs::create_dir_all(&dir).unwrap();
  dir
}

/// Write the six cube faces as 2x2 PNGs into `dir`.
pub fn write_cube_faces(dir: &Path) {
  for name in crate::cubemap::CUBE_FACE_NAMES {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([40, 80, 160, 255]));
    img.save(dir.join(format!("{name}.png"))).unwrap();
  }
}
