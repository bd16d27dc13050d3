//! Per-device controller records.
//!
//! A record mirrors the last state the runtime delivered for one device
//! slot. Identity is the runtime-assigned `index`, unique while the device
//! is connected. Scene nodes are owned by the record through [`ControllerNodes`]
//! once the container has attached the subtree on the render thread.

use glam::Mat4;
use smallvec::SmallVec;
use tracing::debug;

use crate::delegate::{NO_IMMERSIVE_INDEX, NO_TRIGGER_VALUE};
use crate::scene::NodeId;

/// Upper bound on addressable button slots. Real devices expose a handful;
/// events naming slots beyond this are malformed and ignored.
pub const MAX_BUTTON_SLOTS: u32 = 64;

/// Which hand the device presents as. Informational; affects beam/model
/// selection only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
  Left,
  Right,
}

/// State of one logical button slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonState {
  /// Local slot id (position in the button sequence).
  pub id: u32,
  pub pressed: bool,
  pub touched: bool,
  /// External semantic button id, [`NO_IMMERSIVE_INDEX`] when unmapped.
  pub immersive_index: i32,
  /// Analog trigger value, [`NO_TRIGGER_VALUE`] for digital buttons.
  pub immersive_trigger: f32,
}

impl ButtonState {
  fn unset(id: u32) -> Self {
    Self {
      id,
      pressed: false,
      touched: false,
      immersive_index: NO_IMMERSIVE_INDEX,
      immersive_trigger: NO_TRIGGER_VALUE,
    }
  }
}

/// Scene nodes owned by one controller record.
///
/// `root` is the pose transform parented under the container root toggle.
/// `model_root` is the persistent placeholder async-loaded models are
/// swapped beneath; it is never removed while the record lives, so the
/// reference stays valid across swaps.
#[derive(Clone, Copy, Debug)]
pub struct ControllerNodes {
  pub root: NodeId,
  pub beam_toggle: NodeId,
  pub beam: Option<NodeId>,
  pub model_root: NodeId,
}

/// One live controller record.
#[derive(Debug)]
pub struct Controller {
  pub index: i32,
  pub hand: Hand,
  /// Runtime-reported device name, e.g. "oculus-left".
  pub immersive_name: String,
  /// Asset selector for model loads; negative means none requested yet.
  pub model_index: i32,
  pub enabled: bool,
  pub visible: bool,
  /// Pose in tracking space, overwritten every update.
  pub transform: Mat4,
  pub buttons: SmallVec<[ButtonState; 8]>,
  pub axes: SmallVec<[f32; 8]>,
  /// Touch position, `None` while no touch is active.
  pub touch: Option<(f32, f32)>,
  /// Transient per-update scroll delta.
  pub scroll_delta: (f32, f32),
  pub left_handed: bool,
  /// Set once the container attaches the subtree on the render thread.
  pub nodes: Option<ControllerNodes>,
}

impl Controller {
  pub fn new(index: i32, model_index: i32, immersive_name: &str) -> Self {
    // Runtimes encode the hand in the device name ("...-left"); the field
    // stays informational either way.
    let hand = if immersive_name.to_ascii_lowercase().contains("left") {
      Hand::Left
    } else {
      Hand::Right
    };

    Self {
      index,
      hand,
      immersive_name: immersive_name.to_owned(),
      model_index,
      enabled: false,
      visible: false,
      transform: Mat4::IDENTITY,
      buttons: SmallVec::new(),
      axes: SmallVec::new(),
      touch: None,
      scroll_delta: (0.0, 0.0),
      left_handed: false,
      nodes: None,
    }
  }

  /// Resize the button sequence, preserving entries by position. Counts
  /// above [`MAX_BUTTON_SLOTS`] are clamped.
  pub fn set_button_count(&mut self, count: u32) {
    let count = count.min(MAX_BUTTON_SLOTS) as usize;
    if count < self.buttons.len() {
      self.buttons.truncate(count);
    } else {
      for id in self.buttons.len()..count {
        self.buttons.push(ButtonState::unset(id as u32));
      }
    }
  }

  /// Update one button slot, growing the sequence if the slot does not
  /// exist yet. Slots at or above [`MAX_BUTTON_SLOTS`] are ignored.
  pub fn set_button_state(
    &mut self,
    button: u32,
    immersive_index: i32,
    pressed: bool,
    touched: bool,
    trigger: f32,
  ) {
    if button >= MAX_BUTTON_SLOTS {
      debug!(button, "ignoring button event beyond slot range");
      return;
    }
    if (button as usize) >= self.buttons.len() {
      self.set_button_count(button + 1);
    }
    self.buttons[button as usize] = ButtonState {
      id: button,
      pressed,
      touched,
      immersive_index,
      immersive_trigger: trigger,
    };
  }

  /// Clear per-frame transient state (touch, scroll, button edges) without
  /// touching identity, pose, or the axis sequence.
  pub fn reset_transient(&mut self) {
    self.touch = None;
    self.scroll_delta = (0.0, 0.0);
    for button in &mut self.buttons {
      button.pressed = false;
      button.touched = false;
      button.immersive_trigger = NO_TRIGGER_VALUE;
    }
  }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;
