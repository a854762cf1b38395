//! # iOS
//!
//! Two IME adapters for UIKit, selected when building the `ime-bridge` facade:
//!
//! - [`ConfirmBarImeHandler`] docks a text field and a confirm button on top of the keyboard and
//!   reports the field content through result text notifications.
//! - [`BackwardFieldImeHandler`] types into an invisible field, reporting committed characters,
//!   marked text as the composition, and backspaces on the empty field.
//!
//! Both track the keyboard height through the keyboard notifications and stop text input when
//! the game view above the keyboard is tapped. The adapter logic is driven through
//! [`ConfirmBarHost`] and [`BackwardFieldHost`]; on iOS the `platform` module binds them to
//! UIKit views.

mod backward_field;
mod confirm_bar;
#[cfg(target_os = "ios")]
pub mod platform;
mod screen;

pub use self::backward_field::{
    BackwardFieldHost, BackwardFieldImeHandler, FieldSnapshot, MarkedText,
};
pub use self::confirm_bar::{ConfirmBarHost, ConfirmBarImeHandler};
pub use self::screen::{replace_six_per_em_space, ScreenMetrics, INPUT_PANEL_HEIGHT};
