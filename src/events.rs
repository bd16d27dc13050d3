//! Cross-thread marshaling for controller events.
//!
//! The container assumes a single-threaded delegate call site on the render
//! thread. Runtimes that deliver device events from their own thread use
//! this hand-off queue instead: [`ControllerEventProxy`] implements
//! [`ControllerDelegate`] and is `Send`/`Clone`, so it can live on the
//! runtime thread; the render thread drains the paired
//! [`ControllerEventQueue`] into the real container once per frame, before
//! traversal.

use crossbeam_channel::{Receiver, Sender};
use glam::Mat4;

use crate::delegate::ControllerDelegate;

/// One marshaled device event.
#[derive(Clone, Debug)]
pub enum ControllerEvent {
  Create {
    index: i32,
    model_index: i32,
    immersive_name: String,
  },
  Destroy {
    index: i32,
  },
  Enabled {
    index: i32,
    enabled: bool,
  },
  Visible {
    index: i32,
    visible: bool,
  },
  Transform {
    index: i32,
    transform: Mat4,
  },
  ButtonCount {
    index: i32,
    count: u32,
  },
  ButtonState {
    index: i32,
    button: u32,
    immersive_index: i32,
    pressed: bool,
    touched: bool,
    trigger: f32,
  },
  Axes {
    index: i32,
    axes: Vec<f32>,
  },
  LeftHanded {
    index: i32,
    left_handed: bool,
  },
  TouchPosition {
    index: i32,
    x: f32,
    y: f32,
  },
  EndTouch {
    index: i32,
  },
  ScrolledDelta {
    index: i32,
    dx: f32,
    dy: f32,
  },
}

impl ControllerEvent {
  /// Replay this event into a delegate.
  pub fn apply(self, delegate: &mut dyn ControllerDelegate) {
    match self {
      Self::Create {
        index,
        model_index,
        immersive_name,
      } => delegate.create_controller(index, model_index, &immersive_name),
      Self::Destroy { index } => delegate.destroy_controller(index),
      Self::Enabled { index, enabled } => delegate.set_enabled(index, enabled),
      Self::Visible { index, visible } => delegate.set_visible(index, visible),
      Self::Transform { index, transform } => delegate.set_transform(index, transform),
      Self::ButtonCount { index, count } => delegate.set_button_count(index, count),
      Self::ButtonState {
        index,
        button,
        immersive_index,
        pressed,
        touched,
        trigger,
      } => delegate.set_button_state(index, button, immersive_index, pressed, touched, trigger),
      Self::Axes { index, axes } => delegate.set_axes(index, &axes),
      Self::LeftHanded { index, left_handed } => delegate.set_left_handed(index, left_handed),
      Self::TouchPosition { index, x, y } => delegate.set_touch_position(index, x, y),
      Self::EndTouch { index } => delegate.end_touch(index),
      Self::ScrolledDelta { index, dx, dy } => delegate.set_scrolled_delta(index, dx, dy),
    }
  }
}

/// Create a connected proxy/queue pair.
pub fn event_channel() -> (ControllerEventProxy, ControllerEventQueue) {
  let (sender, receiver) = crossbeam_channel::unbounded();
  (
    ControllerEventProxy { sender },
    ControllerEventQueue { receiver },
  )
}

/// Runtime-thread half: a delegate that enqueues instead of mutating.
///
/// Sends never block. If the queue side has been dropped the events are
/// silently discarded, matching the absorb-everything error policy of the
/// device-event interface.
#[derive(Clone)]
pub struct ControllerEventProxy {
  sender: Sender<ControllerEvent>,
}

impl ControllerEventProxy {
  fn push(&self, event: ControllerEvent) {
    // Receiver dropped means the render side is gone; nothing to deliver to.
    let _ = self.sender.send(event);
  }
}

impl ControllerDelegate for ControllerEventProxy {
  fn create_controller(&mut self, index: i32, model_index: i32, immersive_name: &str) {
    self.push(ControllerEvent::Create {
      index,
      model_index,
      immersive_name: immersive_name.to_owned(),
    });
  }

  fn destroy_controller(&mut self, index: i32) {
    self.push(ControllerEvent::Destroy { index });
  }

  fn set_enabled(&mut self, index: i32, enabled: bool) {
    self.push(ControllerEvent::Enabled { index, enabled });
  }

  fn set_visible(&mut self, index: i32, visible: bool) {
    self.push(ControllerEvent::Visible { index, visible });
  }

  fn set_transform(&mut self, index: i32, transform: Mat4) {
    self.push(ControllerEvent::Transform { index, transform });
  }

  fn set_button_count(&mut self, index: i32, count: u32) {
    self.push(ControllerEvent::ButtonCount { index, count });
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
    self.push(ControllerEvent::ButtonState {
      index,
      button,
      immersive_index,
      pressed,
      touched,
      trigger,
    });
  }

  fn set_axes(&mut self, index: i32, axes: &[f32]) {
    self.push(ControllerEvent::Axes {
      index,
      axes: axes.to_vec(),
    });
  }

  fn set_left_handed(&mut self, index: i32, left_handed: bool) {
    self.push(ControllerEvent::LeftHanded { index, left_handed });
  }

  fn set_touch_position(&mut self, index: i32, x: f32, y: f32) {
    self.push(ControllerEvent::TouchPosition { index, x, y });
  }

  fn end_touch(&mut self, index: i32) {
    self.push(ControllerEvent::EndTouch { index });
  }

  fn set_scrolled_delta(&mut self, index: i32, dx: f32, dy: f32) {
    self.push(ControllerEvent::ScrolledDelta { index, dx, dy });
  }
}

/// Render-thread half: drains marshaled events into the real delegate.
pub struct ControllerEventQueue {
  receiver: Receiver<ControllerEvent>,
}

impl ControllerEventQueue {
  /// Replay every queued event in delivery order. Returns the number of
  /// events applied.
  pub fn drain_into(&self, delegate: &mut dyn ControllerDelegate) -> usize {
    let mut applied = 0;
    for event in self.receiver.try_iter() {
      event.apply(delegate);
      applied += 1;
    }
    applied
  }

  /// Number of events currently queued.
  pub fn len(&self) -> usize {
    self.receiver.len()
  }

  pub fn is_empty(&self) -> bool {
    self.receiver.is_empty()
  }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;
