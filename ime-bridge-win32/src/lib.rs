//! # Windows
//!
//! The Windows IME adapter talks to the system IME through IMM32. There is no on-screen
//! keyboard: characters and composition updates from the IME attached to the game window are
//! forwarded while text input is active, and the candidate window is kept clear of the text
//! input rect.
//!
//! The adapter logic is driven through [`ImeContextHost`]. On Windows, the [`imm`] module binds
//! it to a window and translates its IME messages.

mod candidates;
mod handler;
#[cfg(target_os = "windows")]
pub mod imm;
#[cfg(target_os = "windows")]
pub mod keymap;

pub use self::candidates::parse_candidate_list;
pub use self::handler::{ImeContextHost, Win32ImeHandler};
