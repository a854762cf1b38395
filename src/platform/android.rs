//! # Android
//!
//! [`AndroidImeHandler`] docks an editor and a confirm button above the soft keyboard. The engine
//! draws the confirm bar from [`AndroidImeHandler::input_panel`]; the editor content is reported
//! through [`ResultTextEvent`]s, composition stays inside the OS input method.
//!
//! The binding to a `GameActivity` is opt-in: with the `android-game-activity` feature, the
//! `activity` module provides it and `PlatformImeHandler` is defined. Without it, nothing selects
//! an `android-activity` backend and the application implements [`SoftInputHost`] itself:
//!
//! ```ignore
//! use ime_bridge::platform::android::activity;
//!
//! let handler = activity::new_handler(app.clone(), ImeAttributes::default());
//! app.input_events_iter()?.next(|event| {
//!     activity::handle_input_event(&handler, &mut touches, event)
//! });
//! ```
//!
//! [`ResultTextEvent`]: crate::ime::ResultTextEvent

#[cfg(android_game_activity)]
pub use ime_bridge_android::activity;
pub use ime_bridge_android::{
    AndroidImeHandler, EditorAction, InputPanel, SoftInputHost, KEYBOARD_HIDE_OFFSET,
};
