//! # iOS
//!
//! Two adapters are available:
//!
//! - [`ConfirmBarImeHandler`] docks a text field and a confirm button on top of the keyboard, and
//!   reports the field content through [`ResultTextEvent`]s.
//! - [`BackwardFieldImeHandler`] types into an invisible field and reports committed characters,
//!   marked text as the composition, and backspaces on the empty field.
//!
//! The facade's `PlatformImeHandler` is the confirm bar unless the `ios-backward-field` feature
//! is enabled. Both are constructed from the game's `UIView` with the functions of the
//! `platform` module, and stop text input when the game view above the keyboard is tapped, which
//! the view reports by calling `update` with its touches every frame.
//!
//! [`ResultTextEvent`]: crate::ime::ResultTextEvent

#[cfg(ios_platform)]
pub use ime_bridge_uikit::platform;
pub use ime_bridge_uikit::{
    replace_six_per_em_space, BackwardFieldHost, BackwardFieldImeHandler, ConfirmBarHost,
    ConfirmBarImeHandler, FieldSnapshot, MarkedText, ScreenMetrics, INPUT_PANEL_HEIGHT,
};
