//! Skybox - environment backdrop with two mutually exclusive
//! representations.
//!
//! A skybox is either a compositor cube layer (GPU-resident, placed by the
//! host compositor) or a geometry fallback (inward-facing cube mesh plus
//! cube texture under a transform node). The representation is chosen at
//! creation and never switched.
//!
//! The geometry path follows the shared swap protocol: a worker task builds
//! the mesh and decodes the six faces, and [`Skybox::update`] swaps the
//! result beneath the retained placeholder transform on the render thread.
//! The layer path defers until the compositor reports a texture handle via
//! [`Skybox::surface_changed`].

use glam::Mat4;
use tracing::{debug, warn};

use crate::cubemap::{build_cube_mesh, load_cube_map};
use crate::loader::{AssetLoader, LoadTicket};
use crate::scene::{Color, CubeLayer, CubeMapData, CubeMesh, NodeId, SceneGraph, TextureSampling};

/// Backdrop construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct SkyboxConfig {
  /// Half-extent of the geometry cube in world units.
  pub depth: f32,
  /// Sampling parameters delivered with the decoded faces.
  pub sampling: TextureSampling,
}

impl Default for SkyboxConfig {
  fn default() -> Self {
    Self {
      depth: 140.0,
      sampling: TextureSampling::default(),
    }
  }
}

impl SkyboxConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_depth(mut self, depth: f32) -> Self {
    self.depth = depth;
    self
  }

  pub fn with_sampling(mut self, sampling: TextureSampling) -> Self {
    self.sampling = sampling;
    self
  }
}

/// Payload of one geometry build task.
struct GeometryBuild {
  mesh: CubeMesh,
  faces: CubeMapData,
}

enum Representation {
  Layer {
    layer: Box<dyn CubeLayer>,
    /// Captured on surface change; `None` until the surface exists.
    texture_handle: Option<u32>,
  },
  Geometry {
    /// Persistent placeholder the built subtree swaps beneath.
    transform: NodeId,
    /// Current built subtree, if any.
    built: Option<NodeId>,
  },
}

/// Environment backdrop resource manager.
pub struct Skybox {
  root: NodeId,
  config: SkyboxConfig,
  repr: Representation,
  base_path: String,
  extension: String,
  pending: Option<(LoadTicket, AssetLoader)>,
}

impl Skybox {
  /// Create a skybox. With `Some(layer)` the compositor cube layer is the
  /// representation for this instance's whole lifetime; with `None` the
  /// geometry fallback is used.
  pub fn create(
    graph: &mut dyn SceneGraph,
    layer: Option<Box<dyn CubeLayer>>,
    config: SkyboxConfig,
  ) -> Self {
    let root = graph.create_toggle();

    let repr = match layer {
      Some(layer) => {
        let layer_node = graph.create_layer_node();
        graph.add_child(root, layer_node);
        Representation::Layer {
          layer,
          texture_handle: None,
        }
      }
      None => {
        let transform = graph.create_transform();
        graph.add_child(root, transform);
        Representation::Geometry {
          transform,
          built: None,
        }
      }
    };

    Self {
      root,
      config,
      repr,
      base_path: String::new(),
      extension: String::new(),
      pending: None,
    }
  }

  /// The backdrop root toggle node.
  pub fn root(&self) -> NodeId {
    self.root
  }

  /// True while a geometry build task is in flight or awaiting attach.
  pub fn is_load_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Load the backdrop named by `base_path`/`extension`.
  ///
  /// Idempotent: a repeated call with the current `base_path` performs no
  /// additional resource builds. The layer path defers the texture build
  /// until a handle exists; the geometry path schedules an async build.
  pub fn load(&mut self, loader: &AssetLoader, base_path: &str, extension: &str) {
    if self.base_path == base_path {
      return;
    }
    self.base_path = base_path.to_owned();
    self.extension = extension.to_owned();

    if matches!(self.repr, Representation::Layer { .. }) {
      self.load_layer();
    } else {
      self.load_geometry(loader);
    }
  }

  fn load_geometry(&mut self, loader: &AssetLoader) {
    let base_path = self.base_path.clone();
    let extension = self.extension.clone();
    let depth = self.config.depth;
    let sampling = self.config.sampling;

    let ticket = loader.submit(move || {
      let faces = load_cube_map(&base_path, &extension, sampling)?;
      Ok(GeometryBuild {
        mesh: build_cube_mesh(depth),
        faces,
      })
    });

    // A newer load supersedes any in-flight build.
    if let Some((stale, stale_loader)) = self.pending.replace((ticket, loader.clone())) {
      stale_loader.discard(stale);
    }
  }

  /// Bind the cube texture to the compositor layer.
  ///
  /// No-op until both preconditions hold: a non-empty `base_path` from
  /// `load` and a texture handle from the compositor surface.
  fn load_layer(&mut self) {
    let Representation::Layer {
      layer,
      texture_handle,
    } = &mut self.repr
    else {
      return;
    };

    if self.base_path.is_empty() || texture_handle.is_none() {
      debug!("layer texture deferred until path and handle are present");
      return;
    }

    match load_cube_map(&self.base_path, &self.extension, self.config.sampling) {
      Ok(faces) => {
        layer.bind_cube_map(&faces);
        layer.set_loaded(true);
      }
      Err(error) => {
        warn!(base_path = %self.base_path, %error, "layer cube map load failed");
      }
    }
  }

  /// Compositor notification that the layer surface changed.
  ///
  /// Captures the new texture handle, rebuilds the layer texture, then
  /// invokes `callback`. No-op for the geometry representation.
  pub fn surface_changed(&mut self, callback: Option<Box<dyn FnOnce()>>) {
    match &mut self.repr {
      Representation::Layer {
        layer,
        texture_handle,
      } => *texture_handle = layer.texture_handle(),
      Representation::Geometry { .. } => return,
    }

    self.load_layer();
    if let Some(callback) = callback {
      callback();
    }
  }

  /// Per-frame render-thread step for the geometry representation: land a
  /// completed build beneath the placeholder. No-op otherwise.
  pub fn update(&mut self, graph: &mut dyn SceneGraph) {
    let Some((ticket, loader)) = &self.pending else {
      return;
    };
    let Some(completion) = loader.poll::<GeometryBuild>(*ticket) else {
      return;
    };
    self.pending = None;

    let Representation::Geometry { transform, built } = &mut self.repr else {
      return;
    };

    match completion.result {
      Ok(build) => {
        graph.clear_children(*transform);
        *built = Some(graph.build_cube_mesh(*transform, &build.mesh, &build.faces));
        debug!(
          base_path = %self.base_path,
          load_time_us = completion.load_time_us,
          "skybox geometry attached"
        );
      }
      Err(error) => {
        // Previous backdrop (or nothing) stays in place.
        warn!(base_path = %self.base_path, %error, "skybox build failed");
      }
    }
  }

  /// Toggle the whole backdrop subtree.
  pub fn set_visible(&mut self, graph: &mut dyn SceneGraph, visible: bool) {
    graph.set_visible(self.root, visible);
  }

  /// Position the geometry backdrop. The compositor owns the layer's
  /// placement, so this is a no-op for the layer representation.
  pub fn set_transform(&mut self, graph: &mut dyn SceneGraph, transform: Mat4) {
    if let Representation::Geometry {
      transform: node, ..
    } = &self.repr
    {
      graph.set_transform(*node, transform);
    }
  }

  /// Tint the layer if present, else the built geometry.
  pub fn set_tint_color(&mut self, graph: &mut dyn SceneGraph, color: Color) {
    match &mut self.repr {
      Representation::Layer { layer, .. } => layer.set_tint(color),
      Representation::Geometry { built, .. } => {
        if let Some(node) = built {
          graph.set_tint(*node, color);
        }
      }
    }
  }
}

impl Drop for Skybox {
  fn drop(&mut self) {
    if let Some((ticket, loader)) = &self.pending {
      loader.discard(*ticket);
    }
  }
}

#[cfg(test)]
#[path = "skybox_test.rs"]
mod skybox_test;
