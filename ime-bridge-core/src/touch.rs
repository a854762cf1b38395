//! Per-frame touch snapshots consumed by the keyboard auto-dismiss check.

use dpi::PhysicalPosition;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Phase of a touch as seen by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TouchPhase {
    /// The touch went down since the previous frame.
    Pressed,
    /// The touch was already down in the previous frame.
    Moved,
    /// The touch was lifted or cancelled since the previous frame.
    Released,
}

/// One touch point in a frame snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchSample {
    pub id: u64,
    /// Position in physical pixels from the top-left corner of the game surface.
    pub position: PhysicalPosition<f64>,
    pub phase: TouchPhase,
}

impl TouchSample {
    pub fn new(id: u64, position: PhysicalPosition<f64>, phase: TouchPhase) -> Self {
        Self { id, position, phase }
    }
}

/// Returns `true` if a touch that went down this frame lies strictly above `threshold_y`.
pub fn pressed_above(touches: &[TouchSample], threshold_y: f64) -> bool {
    touches
        .iter()
        .any(|touch| touch.phase == TouchPhase::Pressed && touch.position.y < threshold_y)
}

#[derive(Debug, Clone, Copy)]
struct TrackedTouch {
    sample: TouchSample,
    reported: bool,
    lifted: bool,
}

/// Accumulates native touch callbacks into frame snapshots.
///
/// Native toolkits report touches as they happen, possibly several times per frame. The panel
/// keeps the latest state of every touch and hands out one snapshot per frame through
/// [`TouchPanel::take_state`], in which a touch is `Pressed` exactly once. A touch that goes down
/// and up within a single frame is still reported as `Pressed` first and `Released` in the next
/// snapshot.
#[derive(Debug, Default)]
pub struct TouchPanel {
    touches: Vec<TrackedTouch>,
}

impl TouchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_down(&mut self, id: u64, position: PhysicalPosition<f64>) {
        self.touches.retain(|touch| touch.sample.id != id);
        self.touches.push(TrackedTouch {
            sample: TouchSample::new(id, position, TouchPhase::Pressed),
            reported: false,
            lifted: false,
        });
    }

    pub fn touch_moved(&mut self, id: u64, position: PhysicalPosition<f64>) {
        if let Some(touch) = self.find(id) {
            touch.sample.position = position;
        } else {
            tracing::trace!(id, "move for unknown touch");
        }
    }

    /// Record a lifted or cancelled touch.
    pub fn touch_up(&mut self, id: u64, position: PhysicalPosition<f64>) {
        if let Some(touch) = self.find(id) {
            touch.sample.position = position;
            touch.lifted = true;
        }
    }

    /// Produce the snapshot for the current frame and age the tracked touches.
    pub fn take_state(&mut self) -> Vec<TouchSample> {
        let mut snapshot = Vec::with_capacity(self.touches.len());
        for touch in &mut self.touches {
            touch.sample.phase = if !touch.reported {
                TouchPhase::Pressed
            } else if touch.lifted {
                TouchPhase::Released
            } else {
                TouchPhase::Moved
            };
            touch.reported = true;
            snapshot.push(touch.sample);
        }
        self.touches.retain(|touch| touch.sample.phase != TouchPhase::Released);
        snapshot
    }

    fn find(&mut self, id: u64) -> Option<&mut TrackedTouch> {
        self.touches.iter_mut().find(|touch| touch.sample.id == id)
    }
}
