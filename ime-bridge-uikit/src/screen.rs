//! Keyboard and screen bookkeeping shared by both UIKit adapters.

use std::cell::Cell;

use ime_bridge_core::touch::{self, TouchSample};

/// Height of the confirm bar in points.
pub const INPUT_PANEL_HEIGHT: u32 = 40;

/// Screen metrics of the view the adapter is attached to.
pub trait ScreenMetrics {
    /// Points to pixels factor of the main screen, which can differ from the view's content scale.
    fn screen_scale(&self) -> f64;

    /// Height of the key window in points.
    fn window_height(&self) -> f64;
}

/// Soft keyboard height, as reported by the keyboard notifications.
#[derive(Debug, Default)]
pub(crate) struct KeyboardFrame {
    height: Cell<u32>,
}

impl KeyboardFrame {
    /// Record a keyboard about to show, `height` in points. Returns the height in pixels.
    pub fn will_show(&self, height: f64, scale: f64) -> u32 {
        let pixels = (height * scale).max(0.0) as u32;
        self.height.set(pixels);
        pixels
    }

    pub fn will_hide(&self) {
        self.height.set(0);
    }

    /// In pixels.
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Whether a touch was pressed on the game surface more than `offset` pixels above the
    /// keyboard.
    pub fn tapped_above(
        &self,
        metrics: &impl ScreenMetrics,
        touches: &[TouchSample],
        offset: u32,
    ) -> bool {
        let keyboard_top =
            metrics.window_height() * metrics.screen_scale() - f64::from(self.height.get());
        touch::pressed_above(touches, keyboard_top - f64::from(offset))
    }
}

/// Replace every U+2006 SIX-PER-EM SPACE with an ASCII space.
///
/// The Japanese keyboards separate romaji segments of marked text with it, and engine fonts rarely
/// have a glyph for it.
pub fn replace_six_per_em_space(text: &str) -> String {
    text.replace('\u{2006}', " ")
}
