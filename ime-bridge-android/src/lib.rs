//! # Android
//!
//! The Android IME adapter docks a single-line editor and a confirm button above the soft
//! keyboard. Composition is handled by the OS input method inside the editor; the adapter
//! reports the editor content through result text notifications.
//!
//! The adapter logic is independent of the Android SDK and is driven through
//! [`SoftInputHost`]. On Android with the `game-activity` feature, the `activity` module binds it
//! to a `GameActivity`. Without the feature no `android-activity` backend is pulled in, and the
//! application provides its own [`SoftInputHost`].

#[cfg(all(target_os = "android", feature = "game-activity"))]
pub mod activity;
mod handler;

pub use self::handler::{
    AndroidImeHandler, EditorAction, InputPanel, SoftInputHost, KEYBOARD_HIDE_OFFSET,
};
