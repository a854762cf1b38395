//! Construction-time settings shared by all IME adapters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Attributes used when creating an IME adapter.
///
/// Settings a backend has no use for are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImeAttributes {
    pub confirm_text: String,
    pub initial_text: String,
    pub dismiss_offset: Option<u32>,
    pub input_panel_height: u32,
    pub show_os_ime_window: bool,
}

impl Default for ImeAttributes {
    #[inline]
    fn default() -> ImeAttributes {
        ImeAttributes {
            confirm_text: "OK".to_owned(),
            initial_text: String::new(),
            dismiss_offset: None,
            input_panel_height: 40,
            show_os_ime_window: true,
        }
    }
}

impl ImeAttributes {
    /// Sets the caption of the confirm button.
    ///
    /// The default is `"OK"`.
    ///
    /// ## Platform-specific
    ///
    /// - **Windows / iOS (backward field):** Unsupported, there is no confirm button.
    #[inline]
    pub fn with_confirm_text(mut self, confirm_text: impl Into<String>) -> Self {
        self.confirm_text = confirm_text.into();
        self
    }

    /// Sets the text the input field is seeded with when text input starts.
    #[inline]
    pub fn with_initial_text(mut self, initial_text: impl Into<String>) -> Self {
        self.initial_text = initial_text.into();
        self
    }

    /// Sets how far above the keyboard, in physical pixels, a tap must land to dismiss it.
    ///
    /// When unset, the backend default is used: 80 on Android, the input panel height on iOS.
    ///
    /// ## Platform-specific
    ///
    /// - **Windows:** Unsupported.
    #[inline]
    pub fn with_dismiss_offset(mut self, dismiss_offset: u32) -> Self {
        self.dismiss_offset = Some(dismiss_offset);
        self
    }

    /// Sets the height of the confirm bar docked above the keyboard.
    ///
    /// This is in points on iOS. On Android it is the initial height in physical pixels, used
    /// until the panel reports its measured height.
    ///
    /// The default is `40`.
    #[inline]
    pub fn with_input_panel_height(mut self, input_panel_height: u32) -> Self {
        self.input_panel_height = input_panel_height;
        self
    }

    /// Sets whether the OS draws its own composition and candidate windows.
    ///
    /// Turn this off when the game renders the composition from
    /// [`TextCompositionEvent`](crate::ime::TextCompositionEvent)s itself.
    ///
    /// The default is `true`.
    ///
    /// ## Platform-specific
    ///
    /// - **Android / iOS:** Unsupported.
    #[inline]
    pub fn with_os_ime_window(mut self, show_os_ime_window: bool) -> Self {
        self.show_os_ime_window = show_os_ime_window;
        self
    }

    /// The dismiss offset, or `default` if none was set.
    pub fn dismiss_offset_or(&self, default: u32) -> u32 {
        self.dismiss_offset.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::ImeAttributes;

    #[test]
    fn builder_overrides_defaults() {
        let attributes = ImeAttributes::default()
            .with_confirm_text("确定")
            .with_initial_text("player")
            .with_dismiss_offset(12)
            .with_os_ime_window(false);

        assert_eq!(attributes.confirm_text, "确定");
        assert_eq!(attributes.initial_text, "player");
        assert_eq!(attributes.dismiss_offset_or(80), 12);
        assert_eq!(attributes.input_panel_height, 40);
        assert!(!attributes.show_os_ime_window);
        assert_eq!(ImeAttributes::default().dismiss_offset_or(80), 80);
    }
}
