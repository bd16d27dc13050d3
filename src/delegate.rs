//! Device-event interface consumed from the VR runtime.
//!
//! One stable trait, multiple runtime backends (OpenXR, OculusVR, test
//! fakes). Every method is total over its input domain: events addressed to
//! an index with no live record are absorbed silently, and no method may
//! block - the runtime is trusted but may race create/destroy against state
//! updates, so "update before create" and "update after destroy" are both
//! legal call sequences.
//!
//! Indices are assigned by the runtime and arrive in no particular order.

use glam::Mat4;

/// Sentinel for "not mapped to an immersive (external semantic) button id".
pub const NO_IMMERSIVE_INDEX: i32 = -1;

/// Sentinel trigger value meaning "not an analog trigger".
pub const NO_TRIGGER_VALUE: f32 = -1.0;

/// Controller event sink driven by the VR runtime.
pub trait ControllerDelegate {
  /// Insert a record at `index`, replacing any stale record there
  /// (duplicate create is destroy-then-create).
  fn create_controller(&mut self, index: i32, model_index: i32, immersive_name: &str);

  /// Remove the record and release its subtree. No-op on unknown index.
  fn destroy_controller(&mut self, index: i32);

  /// Device is tracked but may be excluded from interaction. Orthogonal to
  /// visibility.
  fn set_enabled(&mut self, index: i32, enabled: bool);

  /// Render-only visibility. Orthogonal to `set_enabled`.
  fn set_visible(&mut self, index: i32, visible: bool);

  /// Overwrite the pose in tracking space. No interpolation; applied to the
  /// scene node on the next render traversal.
  fn set_transform(&mut self, index: i32, transform: Mat4);

  /// Resize the logical button set, preserving existing entries by position
  /// and default-initializing new ones.
  fn set_button_count(&mut self, index: i32, count: u32);

  /// Update or append one button entry. `button` is the local slot id;
  /// `immersive_index` may be [`NO_IMMERSIVE_INDEX`]. `trigger` is
  /// [`NO_TRIGGER_VALUE`] for non-analog buttons.
  fn set_button_state(
    &mut self,
    index: i32,
    button: u32,
    immersive_index: i32,
    pressed: bool,
    touched: bool,
    trigger: f32,
  );

  /// Replace the axis sequence wholesale; the length may differ from the
  /// previous call.
  fn set_axes(&mut self, index: i32, axes: &[f32]);

  /// Swap handedness presentation. Independent of which hand the device
  /// reports.
  fn set_left_handed(&mut self, index: i32, left_handed: bool);

  /// Touch-pad position; only meaningful until `end_touch`.
  fn set_touch_position(&mut self, index: i32, x: f32, y: f32);

  /// Clear touch-active state and position. Idempotent.
  fn end_touch(&mut self, index: i32);

  /// Transient per-update scroll delta; not accumulated.
  fn set_scrolled_delta(&mut self, index: i32, dx: f32, dy: f32);
}
