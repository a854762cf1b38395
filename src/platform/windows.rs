//! # Windows
//!
//! [`Win32ImeHandler`] forwards the characters and composition updates of the IME attached to the
//! game window while text input is active. The window procedure passes its IME messages to
//! `imm::process_message`, and returns the result when one is given:
//!
//! ```ignore
//! if let Some(result) = unsafe { imm::process_message(&handler, hwnd, msg, wparam, lparam) } {
//!     return result;
//! }
//! ```

#[cfg(windows_platform)]
pub use ime_bridge_win32::imm;
#[cfg(windows_platform)]
pub use ime_bridge_win32::keymap;
pub use ime_bridge_win32::{parse_candidate_list, ImeContextHost, Win32ImeHandler};
