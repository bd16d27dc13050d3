use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::test_utils::{scratch_dir, write_cube_faces, FakeCubeLayer, RecordingGraph};

fn geometry_skybox(graph: &mut RecordingGraph) -> Skybox {
  Skybox::create(graph, None, SkyboxConfig::default())
}

fn drive_until_settled(graph: &mut RecordingGraph, skybox: &mut Skybox) {
  for _ in 0..1000 {
    skybox.update(graph);
    if !skybox.is_load_pending() {
      return;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }
  panic!("skybox build never settled");
}

// =============================================================================
// Geometry representation
// =============================================================================

#[test]
fn geometry_load_builds_under_placeholder() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);
  let loader = AssetLoader::new();

  let dir = scratch_dir("sky-geometry");
  write_cube_faces(&dir);

  skybox.load(&loader, dir.to_str().unwrap(), ".png");
  drive_until_settled(&mut graph, &mut skybox);

  assert_eq!(graph.count_cube_meshes_built(), 1);

  // The placeholder transform under the root holds exactly the built mesh.
  let placeholder = graph.children_of(skybox.root())[0];
  assert_eq!(graph.children_of(placeholder).len(), 1);

  std::fs::remove_dir_all(dir).ok();
}

#[test]
fn load_same_path_is_idempotent() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);
  let loader = AssetLoader::new();

  let dir = scratch_dir("sky-idempotent");
  write_cube_faces(&dir);
  let path = dir.to_str().unwrap().to_owned();

  skybox.load(&loader, &path, ".png");
  skybox.load(&loader, &path, ".png");
  drive_until_settled(&mut graph, &mut skybox);
  skybox.load(&loader, &path, ".png");
  drive_until_settled(&mut graph, &mut skybox);

  // One build task total, no redundant uploads.
  assert_eq!(graph.count_cube_meshes_built(), 1);

  std::fs::remove_dir_all(dir).ok();
}

#[test]
fn load_new_path_swaps_backdrop() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);
  let loader = AssetLoader::new();

  let first = scratch_dir("sky-first");
  let second = scratch_dir("sky-second");
  write_cube_faces(&first);
  write_cube_faces(&second);

  skybox.load(&loader, first.to_str().unwrap(), ".png");
  drive_until_settled(&mut graph, &mut skybox);
  skybox.load(&loader, second.to_str().unwrap(), ".png");
  drive_until_settled(&mut graph, &mut skybox);

  assert_eq!(graph.count_cube_meshes_built(), 2);

  // Old subtree replaced; the placeholder still holds exactly one child.
  let placeholder = graph.children_of(skybox.root())[0];
  assert_eq!(graph.children_of(placeholder).len(), 1);

  std::fs::remove_dir_all(first).ok();
  std::fs::remove_dir_all(second).ok();
}

#[test]
fn missing_faces_leave_placeholder_in_place() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);
  let loader = AssetLoader::new();

  skybox.load(&loader, "/nonexistent/skybox", ".png");
  drive_until_settled(&mut graph, &mut skybox);

  assert_eq!(graph.count_cube_meshes_built(), 0);
  let placeholder = graph.children_of(skybox.root())[0];
  assert!(graph.children_of(placeholder).is_empty());
}

#[test]
fn set_transform_applies_to_geometry_placeholder() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);

  let placeholder = graph.children_of(skybox.root())[0];
  let transform = glam::Mat4::from_rotation_y(1.0);
  skybox.set_transform(&mut graph, transform);

  assert_eq!(graph.last_transform(placeholder), Some(transform));
}

#[test]
fn set_visible_toggles_root() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);

  skybox.set_visible(&mut graph, false);
  assert_eq!(graph.last_visibility(skybox.root()), Some(false));
}

#[test]
fn geometry_tint_requires_built_subtree() {
  let mut graph = RecordingGraph::new();
  let mut skybox = geometry_skybox(&mut graph);
  let loader = AssetLoader::new();
  let tint = Color::new(0.5, 0.5, 0.5, 1.0);

  // Nothing built yet: tint has no target.
  skybox.set_tint_color(&mut graph, tint);
  let tints_before = graph
    .ops
    .iter()
    .filter(|op| matches!(op, crate::test_utils::GraphOp::SetTint(..)))
    .count();
  assert_eq!(tints_before, 0);

  let dir = scratch_dir("sky-tint");
  write_cube_faces(&dir);
  skybox.load(&loader, dir.to_str().unwrap(), ".png");
  drive_until_settled(&mut graph, &mut skybox);

  skybox.set_tint_color(&mut graph, tint);
  let tints_after = graph
    .ops
    .iter()
    .filter(|op| matches!(op, crate::test_utils::GraphOp::SetTint(..)))
    .count();
  assert_eq!(tints_after, 1);

  std::fs::remove_dir_all(dir).ok();
}

// =============================================================================
// Layer representation
// =============================================================================

#[test]
fn layer_creation_attaches_layer_node() {
  let mut graph = RecordingGraph::new();
  let layer = FakeCubeLayer::new();
  let skybox = Skybox::create(&mut graph, Some(Box::new(layer)), SkyboxConfig::default());

  assert_eq!(graph.children_of(skybox.root()).len(), 1);
}

#[test]
fn layer_load_defers_until_handle_exists() {
  let mut graph = RecordingGraph::new();
  let layer = FakeCubeLayer::new();
  let state = Arc::clone(&layer.state);
  let mut skybox = Skybox::create(&mut graph, Some(Box::new(layer)), SkyboxConfig::default());
  let loader = AssetLoader::new();

  let dir = scratch_dir("sky-layer");
  write_cube_faces(&dir);

  // Path known but no handle yet: deferred.
  skybox.load(&loader, dir.to_str().unwrap(), ".png");
  assert_eq!(state.lock().unwrap().bind_count, 0);
  assert!(!state.lock().unwrap().loaded);

  // Surface appears: texture is built and the layer marked loaded.
  state.lock().unwrap().texture_handle = Some(7);
  let callback_ran = Arc::new(AtomicUsize::new(0));
  let observed = Arc::clone(&callback_ran);
  skybox.surface_changed(Some(Box::new(move || {
    observed.fetch_add(1, Ordering::Relaxed);
  })));

  assert_eq!(state.lock().unwrap().bind_count, 1);
  assert!(state.lock().unwrap().loaded);
  assert_eq!(callback_ran.load(Ordering::Relaxed), 1);

  std::fs::remove_dir_all(dir).ok();
}

#[test]
fn surface_change_without_path_is_deferred() {
  let mut graph = RecordingGraph::new();
  let layer = FakeCubeLayer::new();
  layer.set_texture_handle(Some(3));
  let state = Arc::clone(&layer.state);
  let mut skybox = Skybox::create(&mut graph, Some(Box::new(layer)), SkyboxConfig::default());

  // Handle exists but no load() happened: still a no-op, callback runs.
  let callback_ran = Arc::new(AtomicUsize::new(0));
  let observed = Arc::clone(&callback_ran);
  skybox.surface_changed(Some(Box::new(move || {
    observed.fetch_add(1, Ordering::Relaxed);
  })));

  assert_eq!(state.lock().unwrap().bind_count, 0);
  assert!(!state.lock().unwrap().loaded);
  assert_eq!(callback_ran.load(Ordering::Relaxed), 1);
}

#[test]
fn layer_tint_goes_to_layer_not_graph() {
  let mut graph = RecordingGraph::new();
  let layer = FakeCubeLayer::new();
  let state = Arc::clone(&layer.state);
  let mut skybox = Skybox::create(&mut graph, Some(Box::new(layer)), SkyboxConfig::default());

  let tint = Color::new(0.2, 0.4, 0.6, 1.0);
  skybox.set_tint_color(&mut graph, tint);

  assert_eq!(state.lock().unwrap().tint, Some(tint));
  assert!(!graph
    .ops
    .iter()
    .any(|op| matches!(op, crate::test_utils::GraphOp::SetTint(..))));
}

#[test]
fn layer_set_transform_is_noop() {
  let mut graph = RecordingGraph::new();
  let layer = FakeCubeLayer::new();
  let mut skybox = Skybox::create(&mut graph, Some(Box::new(layer)), SkyboxConfig::default());

  let ops_before = graph.ops.len();
  skybox.set_transform(&mut graph, glam::Mat4::from_rotation_x(0.5));
  assert_eq!(graph.ops.len(), ops_before);
}
