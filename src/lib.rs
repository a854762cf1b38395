//! ime-bridge connects game engines to the native soft keyboard and input method of the platform
//! they run on.
//!
//! A game view that wants text creates one IME adapter for its native view and drives it through
//! [`TextInputHandler`]: [`start_text_input`] shows the platform's input surface,
//! [`stop_text_input`] hides it again and hands focus back to the game. While text input is
//! active the adapter raises three kinds of notifications, registered on
//! [`TextInputHandler::listeners`]:
//!
//! - [`TextInputEvent`] for every character the input service commits,
//! - [`TextCompositionEvent`] whenever the uncommitted composition changes,
//! - [`ResultTextEvent`] whenever the confirm bar text field changes, and once more, marked
//!   final, when the session stops.
//!
//! ```no_run
//! use ime_bridge::handler::TextInputHandler;
//!
//! fn attach(handler: &impl TextInputHandler) {
//!     handler.listeners().on_text_input(|event| {
//!         println!("typed {:?}", event.character);
//!     });
//!     handler.listeners().on_result_text_updated(|event| {
//!         if event.is_final {
//!             println!("submitted {}", event.text);
//!         }
//!     });
//! }
//! ```
//!
//! Which notifications an adapter raises depends on the platform, see
//! [`TextInputHandler::capabilities`] and the [`platform`] module.
//!
//! # Threading
//!
//! Adapters are bound to the platform UI thread. Listeners run synchronously on that thread, often
//! from inside native toolkit callbacks, and may call back into the adapter.
//!
//! # Cargo features
//!
//! - `android-game-activity`: bind the Android adapter to a `GameActivity` through
//!   `android-activity`, and define `PlatformImeHandler` on Android. Off by default, like winit's
//!   Android backend features; without it the Android adapter is driven through a host the
//!   application implements.
//! - `ios-backward-field`: use [`BackwardFieldImeHandler`] rather than [`ConfirmBarImeHandler`]
//!   as the `PlatformImeHandler` on iOS.
//! - `serde`: implement `Serialize` and `Deserialize` for the notification and attribute types.
//! - `mint`: conversions between the [`dpi`] types and `mint`.
//!
//! [`start_text_input`]: TextInputHandler::start_text_input
//! [`stop_text_input`]: TextInputHandler::stop_text_input
//! [`TextInputHandler`]: handler::TextInputHandler
//! [`TextInputHandler::listeners`]: handler::TextInputHandler::listeners
//! [`TextInputHandler::capabilities`]: handler::TextInputHandler::capabilities
//! [`TextInputEvent`]: ime::TextInputEvent
//! [`TextCompositionEvent`]: ime::TextCompositionEvent
//! [`ResultTextEvent`]: ime::ResultTextEvent
//! [`BackwardFieldImeHandler`]: platform::ios::BackwardFieldImeHandler
//! [`ConfirmBarImeHandler`]: platform::ios::ConfirmBarImeHandler

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg_hide), doc(cfg_hide(doc, docsrs)))]

pub use dpi;
pub use ime_bridge_core::{
    attributes, error, geometry, handler, ime, keyboard, listeners, os_error, touch,
};

pub mod platform;
mod platform_impl;

#[cfg(any(android_game_activity, windows_platform, ios_platform))]
pub use self::platform_impl::PlatformImeHandler;
