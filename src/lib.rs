//! vr_stage_plugin - Framework/engine independent VR controller and skybox
//! scene management
//!
//! This crate owns the state side of a VR shell's stage: an indexed
//! collection of controller records fed by a runtime's device-event stream,
//! and an environment backdrop that is either a compositor cube layer or a
//! textured cube-mesh fallback. The host engine is reached only through the
//! [`scene::SceneGraph`] trait seam; GPU objects never appear here.
//!
//! # Load/swap protocol
//!
//! Renderable resources (controller models, skybox cube maps) are built on
//! worker threads as plain data and swapped beneath persistent placeholder
//! nodes on the render thread:
//!
//! ```text
//! Render Thread                        Worker (rayon)
//! ┌──────────────────┐
//! │ submit(task)     │───────────────► ┌─────────────────┐
//! └──────────────────┘                 │ read / decode   │
//!                                      │ (pure, no live  │
//! ┌──────────────────┐                 │  graph access)  │
//! │ update(graph)    │◄─────────────── └─────────────────┘
//! │ - poll ticket    │
//! │ - owner alive?   │──no──► drop result
//! │ - swap under     │
//! │   placeholder    │
//! └──────────────────┘
//! ```
//!
//! The placeholder is never removed, so references held by the owning
//! record stay valid across the swap, and a completion arriving after its
//! owner was destroyed is discarded instead of attached.
//!
//! # Example
//!
//! ```ignore
//! use vr_stage_plugin::{AssetLoader, ControllerContainer, ControllerDelegate};
//!
//! let loader = AssetLoader::new();
//! let mut container = ControllerContainer::create(&mut graph, pointer_node);
//!
//! // Runtime events (any order, unknown indices absorbed)
//! container.create_controller(0, 2, "oculus-left");
//! container.set_transform(0, pose);
//! container.load_controller_model(2, &loader, "models/touch-left.obj");
//!
//! // Once per frame on the render thread, before traversal
//! container.update(&mut graph);
//! ```

// Scene-graph seam and off-thread build data
pub mod scene;
pub use scene::{
  Color, CubeFace, CubeLayer, CubeMapData, CubeMesh, ModelData, NodeId, SceneGraph,
  TextureSampling,
};

// Async load/swap engine
pub mod loader;
pub use loader::{AssetLoader, Completion, LoadError, LoadTicket};

// Cube-map asset convention
pub mod cubemap;
pub use cubemap::{build_cube_mesh, face_paths, load_cube_map, CUBE_FACE_NAMES};

// Device-event interface
pub mod delegate;
pub use delegate::{ControllerDelegate, NO_IMMERSIVE_INDEX, NO_TRIGGER_VALUE};

// Controller records and container
pub mod controller;
pub use controller::{ButtonState, Controller, ControllerNodes, Hand, MAX_BUTTON_SLOTS};

pub mod container;
pub use container::ControllerContainer;

// Environment backdrop
pub mod skybox;
pub use skybox::{Skybox, SkyboxConfig};

// Cross-thread event marshaling
pub mod events;
pub use events::{event_channel, ControllerEvent, ControllerEventProxy, ControllerEventQueue};

// Test fixtures shared across module tests
#[cfg(test)]
pub mod test_utils;
