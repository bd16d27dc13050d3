//! ControllerContainer - indexed controller records under one scene root.
//!
//! The container implements [`ControllerDelegate`] as a pure state machine:
//! event methods mutate records only and never touch the scene graph, so
//! they are safe to call from the runtime's delivery site without blocking.
//! [`ControllerContainer::update`] runs once per frame on the render thread,
//! before traversal, and is the only place scene topology changes: it
//! attaches subtrees for new records, detaches destroyed ones, syncs pose
//! and visibility, and lands completed model loads.
//!
//! Model loading follows the shared swap protocol: the worker reads the
//! model file bytes, and `update` instantiates them (via
//! [`SceneGraph::build_model`]) beneath the per-controller placeholder of
//! every live record whose `model_index` matches. A completion that finds
//! no matching live record is discarded - destruction during load is not an
//! error.

use glam::Mat4;
use tracing::{debug, warn};

use crate::controller::{Controller, ControllerNodes};
use crate::delegate::ControllerDelegate;
use crate::loader::{AssetLoader, LoadError, LoadTicket};
use crate::scene::{Color, ModelData, NodeId, SceneGraph};

struct PendingModelLoad {
  ticket: LoadTicket,
  loader: AssetLoader,
  model_index: i32,
  file_name: String,
}

/// Owns the live controller records plus their shared scene root.
pub struct ControllerContainer {
  /// Visibility-toggle root; hiding it hides all controllers atomically.
  root: NodeId,
  /// External node supplying the shared ray/pointer visuals.
  pointer_container: NodeId,
  controllers: Vec<Controller>,
  root_visible: bool,
  pointer_color: Color,
  pending_models: Vec<PendingModelLoad>,
  /// Subtree roots of destroyed records, detached on the next update.
  orphaned: Vec<NodeId>,
}

impl ControllerContainer {
  /// Create the container root and attach the shared pointer container
  /// beneath it.
  pub fn create(graph: &mut dyn SceneGraph, pointer_container: NodeId) -> Self {
    let root = graph.create_toggle();
    graph.add_child(root, pointer_container);

    Self {
      root,
      pointer_container,
      controllers: Vec::new(),
      root_visible: true,
      pointer_color: Color::ONE,
      pending_models: Vec::new(),
      orphaned: Vec::new(),
    }
  }

  /// The container root toggle node.
  pub fn root(&self) -> NodeId {
    self.root
  }

  /// Live records, for the renderer's per-frame traversal.
  pub fn controllers(&self) -> &[Controller] {
    &self.controllers
  }

  /// Mutable access to live records.
  ///
  /// Callers must not change record identity through this accessor; only
  /// the delegate event methods may add or remove records.
  pub fn controllers_mut(&mut self) -> &mut [Controller] {
    &mut self.controllers
  }

  /// Number of model loads still in flight or awaiting attach.
  pub fn pending_model_loads(&self) -> usize {
    self.pending_models.len()
  }

  /// Toggle the whole container (all controllers plus pointer visuals)
  /// atomically. Distinct from the per-controller delegate method.
  pub fn set_visible_all(&mut self, visible: bool) {
    self.root_visible = visible;
  }

  /// Tint applied to the shared pointer visuals and every beam.
  pub fn set_pointer_color(&mut self, color: Color) {
    self.pointer_color = color;
  }

  /// Start an async model load for every controller slot using
  /// `model_index`.
  ///
  /// The worker only reads the file; parsing and GPU compilation happen in
  /// the host's `build_model` at attach time. Completion lands in `update`.
  pub fn load_controller_model(&mut self, model_index: i32, loader: &AssetLoader, file_name: &str) {
    if model_index < 0 {
      debug!(model_index, "ignoring model load for negative model index");
      return;
    }

    let path = file_name.to_owned();
    let ticket = loader.submit(move || {
      let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
      })?;
      Ok(ModelData {
        file_name: path,
        bytes,
      })
    });

    self.pending_models.push(PendingModelLoad {
      ticket,
      loader: loader.clone(),
      model_index,
      file_name: file_name.to_owned(),
    });
  }

  /// Rebuild the default beam visuals for every attached controller.
  pub fn initialize_beams(&mut self, graph: &mut dyn SceneGraph) {
    for controller in &mut self.controllers {
      if let Some(nodes) = &mut controller.nodes {
        graph.clear_children(nodes.beam_toggle);
        let beam = graph.build_beam(nodes.beam_toggle);
        graph.set_tint(beam, self.pointer_color);
        nodes.beam = Some(beam);
      }
    }
  }

  /// Clear per-frame transient state on every record without destroying
  /// any controller.
  pub fn reset(&mut self) {
    for controller in &mut self.controllers {
      controller.reset_transient();
    }
  }

  /// Per-frame render-thread step: flush structural changes, sync record
  /// state into the graph, and land completed model loads. Must run before
  /// this frame's traversal.
  pub fn update(&mut self, graph: &mut dyn SceneGraph) {
    for node in self.orphaned.drain(..) {
      graph.remove_child(self.root, node);
    }

    for controller in &mut self.controllers {
      let nodes = match &controller.nodes {
        Some(nodes) => *nodes,
        None => {
          let nodes = attach_subtree(graph, self.root, self.pointer_color);
          controller.nodes = Some(nodes);
          nodes
        }
      };

      graph.set_transform(nodes.root, controller.transform);
      graph.set_visible(nodes.root, controller.visible);
      if let Some(beam) = nodes.beam {
        graph.set_tint(beam, self.pointer_color);
      }
    }

    graph.set_visible(self.root, self.root_visible);
    graph.set_tint(self.pointer_container, self.pointer_color);

    self.land_model_loads(graph);
  }

  fn land_model_loads(&mut self, graph: &mut dyn SceneGraph) {
    let mut still_pending = Vec::new();

    for pending in self.pending_models.drain(..) {
      let completion = match pending.loader.poll::<ModelData>(pending.ticket) {
        Some(completion) => completion,
        None => {
          still_pending.push(pending);
          continue;
        }
      };

      let model = match completion.result {
        Ok(model) => model,
        Err(error) => {
          warn!(
            file_name = %pending.file_name,
            %error,
            "controller model load failed, placeholder stays empty"
          );
          continue;
        }
      };

      let mut attached = 0;
      for controller in &self.controllers {
        if controller.model_index != pending.model_index {
          continue;
        }
        if let Some(nodes) = &controller.nodes {
          graph.clear_children(nodes.model_root);
          graph.build_model(nodes.model_root, &model);
          attached += 1;
        }
      }

      if attached == 0 {
        // Owner destroyed while the load was in flight; drop the result.
        debug!(
          model_index = pending.model_index,
          file_name = %pending.file_name,
          load_time_us = completion.load_time_us,
          "discarding model load with no live controller"
        );
      } else {
        debug!(
          model_index = pending.model_index,
          attached,
          load_time_us = completion.load_time_us,
          "controller model attached"
        );
      }
    }

    self.pending_models = still_pending;
  }

  fn find_mut(&mut self, index: i32) -> Option<&mut Controller> {
    let controller = self.controllers.iter_mut().find(|c| c.index == index);
    if controller.is_none() {
      debug!(index, "event for unknown controller index");
    }
    controller
  }
}

impl Drop for ControllerContainer {
  fn drop(&mut self) {
    for pending in &self.pending_models {
      pending.loader.discard(pending.ticket);
    }
  }
}

/// Build one controller subtree: pose transform holding the beam toggle
/// (with a default beam) and the persistent model placeholder.
fn attach_subtree(
  graph: &mut dyn SceneGraph,
  root: NodeId,
  pointer_color: Color,
) -> ControllerNodes {
  let transform = graph.create_transform();
  let beam_toggle = graph.create_toggle();
  let model_root = graph.create_transform();

  graph.add_child(transform, beam_toggle);
  graph.add_child(transform, model_root);

  let beam = graph.build_beam(beam_toggle);
  graph.set_tint(beam, pointer_color);

  graph.add_child(root, transform);

  ControllerNodes {
    root: transform,
    beam_toggle,
    beam: Some(beam),
    model_root,
  }
}

impl ControllerDelegate for ControllerContainer {
  fn create_controller(&mut self, index: i32, model_index: i32, immersive_name: &str) {
    // Duplicate create is destroy-then-create.
    self.destroy_silent(index);
    debug!(index, model_index, immersive_name, "controller created");
    self.controllers.push(Controller::new(index, model_index, immersive_name));
  }

  fn destroy_controller(&mut self, index: i32) {
    if !self.destroy_silent(index) {
      debug!(index, "destroy for unknown controller index");
    }
  }

  fn set_enabled(&mut self, index: i32, enabled: bool) {
    if let Some(controller) = self.find_mut(index) {
      controller.enabled = enabled;
    }
  }

  fn set_visible(&mut self, index: i32, visible: bool) {
    if let Some(controller) = self.find_mut(index) {
      controller.visible = visible;
    }
  }

  fn set_transform(&mut self, index: i32, transform: Mat4) {
    if let Some(controller) = self.find_mut(index) {
      controller.transform = transform;
    }
  }

  fn set_button_count(&mut self, index: i32, count: u32) {
    if let Some(controller) = self.find_mut(index) {
      controller.set_button_count(count);
    }
  }

  fn set_button_state(
    &mut self,
    index: i32,
    button: u32,
    immersive_index: i32,
    pressed: bool,
    touched: bool,
    trigger: f32,
  ) {
    if let Some(controller) = self.find_mut(index) {
      controller.set_button_state(button, immersive_index, pressed, touched, trigger);
    }
  }

  fn set_axes(&mut self, index: i32, axes: &[f32]) {
    if let Some(controller) = self.find_mut(index) {
      controller.axes.clear();
      controller.axes.extend_from_slice(axes);
    }
  }

  fn set_left_handed(&mut self, index: i32, left_handed: bool) {
    if let Some(controller) = self.find_mut(index) {
      controller.left_handed = left_handed;
    }
  }

  fn set_touch_position(&mut self, index: i32, x: f32, y: f32) {
    if let Some(controller) = self.find_mut(index) {
      controller.touch = Some((x, y));
    }
  }

  fn end_touch(&mut self, index: i32) {
    if let Some(controller) = self.find_mut(index) {
      controller.touch = None;
    }
  }

  fn set_scrolled_delta(&mut self, index: i32, dx: f32, dy: f32) {
    if let Some(controller) = self.find_mut(index) {
      controller.scroll_delta = (dx, dy);
    }
  }
}

impl ControllerContainer {
  /// Remove the record at `index` if present, queuing its subtree for
  /// detach. Returns whether a record existed.
  fn destroy_silent(&mut self, index: i32) -> bool {
    let Some(position) = self.controllers.iter().position(|c| c.index == index) else {
      return false;
    };

    let controller = self.controllers.swap_remove(position);
    if let Some(nodes) = controller.nodes {
      self.orphaned.push(nodes.root);
    }
    true
  }
}

#[cfg(test)]
#[path = "container_test.rs"]
mod container_test;
