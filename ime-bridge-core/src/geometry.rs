//! Screen areas exchanged with native text input services.

use dpi::{PhysicalPosition, PhysicalSize};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in physical pixels, relative to the game surface.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImeRect {
    pub position: PhysicalPosition<i32>,
    pub size: PhysicalSize<u32>,
}

impl ImeRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { position: PhysicalPosition::new(x, y), size: PhysicalSize::new(width, height) }
    }

    pub fn left(&self) -> i32 {
        self.position.x
    }

    pub fn top(&self) -> i32 {
        self.position.y
    }

    pub fn right(&self) -> i32 {
        self.position.x.saturating_add_unsigned(self.size.width)
    }

    pub fn bottom(&self) -> i32 {
        self.position.y.saturating_add_unsigned(self.size.height)
    }
}
