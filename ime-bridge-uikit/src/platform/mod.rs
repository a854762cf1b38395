//! UIKit bindings of the adapters.

#![allow(clippy::unnecessary_cast)]

mod backward_field;
mod confirm_bar;
mod notification;

use objc2::MainThreadMarker;
use objc2_ui_kit::{UIScreen, UIView};

pub use self::backward_field::{new_backward_field_handler, UIKitBackwardField};
pub use self::confirm_bar::{new_confirm_bar_handler, UIKitConfirmBar};

/// Height in points of the window holding `view`, or of the view itself while it has no window.
fn window_height(view: &UIView) -> f64 {
    match view.window() {
        Some(window) => window.frame().size.height as f64,
        None => view.bounds().size.height as f64,
    }
}

/// Points to pixels factor of the main screen.
fn screen_scale(view: &UIView) -> f64 {
    let mtm = MainThreadMarker::from(view);
    UIScreen::mainScreen(mtm).scale() as f64
}
