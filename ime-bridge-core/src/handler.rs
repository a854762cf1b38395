//! The contract every IME adapter implements.

use bitflags::bitflags;

use crate::error::ImeError;
use crate::geometry::ImeRect;
use crate::listeners::ImeListeners;
use crate::touch::TouchSample;

bitflags! {
    /// What an IME adapter is able to do on its platform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// Reports in-progress composition text.
        const COMPOSITION = 1 << 0;
        /// Attaches candidate lists to composition events.
        const CANDIDATE_LIST = 1 << 1;
        /// Shows an on-screen confirm bar with a text field and a confirm button.
        const CONFIRM_BAR = 1 << 2;
        /// Raises result text notifications for the confirm bar field.
        const RESULT_TEXT = 1 << 3;
        /// Reports the height of the on-screen keyboard.
        const KEYBOARD_HEIGHT = 1 << 4;
        /// Honors [`TextInputHandler::set_text_input_rect`].
        const TEXT_INPUT_RECT = 1 << 5;
        /// Stops text input when the game surface above the keyboard is tapped.
        const TOUCH_DISMISS = 1 << 6;
    }
}

/// An IME adapter bound to one native view.
///
/// Every method takes `&self`: adapters are shared between the engine and native toolkit
/// callbacks on the UI thread, and keep their state in cells.
///
/// Calls made against the wrong state are no-ops returning `Ok(())`: starting while active,
/// stopping while inactive.
pub trait TextInputHandler {
    fn capabilities(&self) -> Capabilities;

    /// The notification channels of this adapter.
    fn listeners(&self) -> &ImeListeners;

    fn is_text_input_active(&self) -> bool;

    /// Show the native input surface and give it focus.
    ///
    /// If the platform refuses, the session stays inactive and the error is returned.
    fn start_text_input(&self) -> Result<(), ImeError>;

    /// Finish text input and hand focus back to the game view.
    ///
    /// The session is inactive and the input field empty when this returns, even on error.
    fn stop_text_input(&self) -> Result<(), ImeError>;

    /// Hint where the text caret is, so that candidate windows do not cover it.
    ///
    /// ## Platform-specific
    ///
    /// - **Android / iOS:** Unsupported, this is a no-op.
    fn set_text_input_rect(&self, rect: ImeRect) -> Result<(), ImeError> {
        tracing::trace!(?rect, "text input rect ignored");
        Ok(())
    }

    /// Height of the on-screen keyboard in physical pixels, `0` while hidden.
    fn virtual_keyboard_height(&self) -> u32;

    /// Per-frame housekeeping, called by the owning view with the frame's touch snapshot.
    fn update(&self, touches: &[TouchSample]) {
        let _ = touches;
    }

    /// Release native widgets and observers and drop all listeners.
    ///
    /// An active session is stopped first. Afterwards the adapter is inert and
    /// [`start_text_input`](Self::start_text_input) fails with [`ImeError::Detached`].
    fn detach(&self);
}
