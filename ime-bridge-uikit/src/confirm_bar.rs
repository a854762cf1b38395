use std::cell::RefCell;

use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::handler::{Capabilities, TextInputHandler};
use ime_bridge_core::ime::ResultTextEvent;
use ime_bridge_core::listeners::ImeListeners;
use ime_bridge_core::session::{EditSuppression, SessionState};
use ime_bridge_core::touch::TouchSample;
use tracing::{debug, error};

use crate::screen::{KeyboardFrame, ScreenMetrics};

/// The views of the confirm bar: a panel holding a text field and a confirm button.
pub trait ConfirmBarHost: ScreenMetrics {
    fn set_panel_hidden(&self, hidden: bool);

    /// Move the panel's top edge, in points from the top of the game view.
    fn set_panel_origin_y(&self, y: f64);

    fn set_confirm_title(&self, title: &str);

    fn set_field_text(&self, text: &str);

    fn field_text(&self) -> String;

    fn select_all_field_text(&self);

    /// Make the field first responder, which brings up the keyboard.
    fn focus_field(&self) -> Result<(), ImeError>;

    /// End editing in the field, committing any marked text.
    fn end_editing(&self);

    /// Give first responder back to the game view.
    fn focus_game_view(&self);

    /// Height of the game view's bounds in points.
    fn bounds_height(&self) -> f64;

    /// Remove the views and keyboard observers.
    fn release(&self) {}
}

/// IME adapter for iOS with a confirm bar.
///
/// While text input is active a panel with a text field and a confirm button sits on top of the
/// keyboard. Field edits are reported as non-final [`ResultTextEvent`]s, the field content at
/// the time the session stops as the final one.
pub struct ConfirmBarImeHandler<H> {
    host: H,
    listeners: ImeListeners,
    session: SessionState,
    edits: EditSuppression,
    keyboard: KeyboardFrame,
    current_result_text: RefCell<String>,
    confirm_text: RefCell<String>,
    panel_height: u32,
    dismiss_offset: Option<u32>,
}

impl<H: ConfirmBarHost> ConfirmBarImeHandler<H> {
    pub fn new(host: H, attributes: ImeAttributes) -> Self {
        let this = Self {
            host,
            listeners: ImeListeners::new(),
            session: SessionState::new(),
            edits: EditSuppression::new(),
            keyboard: KeyboardFrame::default(),
            current_result_text: RefCell::new(attributes.initial_text),
            confirm_text: RefCell::new(attributes.confirm_text),
            panel_height: attributes.input_panel_height,
            dismiss_offset: attributes.dismiss_offset,
        };
        this.host.set_panel_hidden(true);
        this.place_panel(0.0);
        this
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn current_result_text(&self) -> String {
        self.current_result_text.borrow().clone()
    }

    /// Set the text the field is seeded with when text input starts.
    pub fn set_current_result_text(&self, text: impl Into<String>) {
        *self.current_result_text.borrow_mut() = text.into();
    }

    /// Set the confirm button title, applied the next time text input starts.
    pub fn set_confirm_text(&self, confirm_text: impl Into<String>) {
        *self.confirm_text.borrow_mut() = confirm_text.into();
    }

    /// Height of the panel in points.
    pub fn input_panel_height(&self) -> u32 {
        self.panel_height
    }

    /// `UIKeyboardWillShowNotification`, with the height of the keyboard's end frame in points.
    pub fn keyboard_will_show(&self, keyboard_height: f64) {
        if self.session.is_detached() {
            return;
        }
        let pixels = self.keyboard.will_show(keyboard_height, self.host.screen_scale());
        debug!(pixels, "keyboard will show");
        self.place_panel(keyboard_height);
    }

    /// `UIKeyboardWillHideNotification`.
    pub fn keyboard_will_hide(&self) {
        if self.session.is_detached() {
            return;
        }
        self.keyboard.will_hide();
        self.place_panel(0.0);
    }

    /// The field's `UIControlEventEditingChanged`.
    pub fn on_editing_changed(&self) {
        if self.edits.is_suppressed() || !self.session.is_active() {
            return;
        }
        let text = self.host.field_text();
        self.listeners.emit_result_text(ResultTextEvent::new(text, false));
    }

    /// `textFieldShouldReturn:`. Finishes text input; returns `false` so the field does not
    /// insert a line break.
    pub fn should_return(&self) -> bool {
        self.stop_from_callback();
        false
    }

    /// The confirm button was tapped.
    pub fn on_confirm_pressed(&self) {
        self.stop_from_callback();
    }

    fn place_panel(&self, keyboard_height: f64) {
        let panel_height = f64::from(self.panel_height);
        self.host.set_panel_origin_y(self.host.bounds_height() - keyboard_height - panel_height);
    }

    fn stop_from_callback(&self) {
        if let Err(err) = self.stop_text_input() {
            error!("failed to stop text input: {err}");
        }
    }
}

impl<H: ConfirmBarHost> TextInputHandler for ConfirmBarImeHandler<H> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::CONFIRM_BAR
            | Capabilities::RESULT_TEXT
            | Capabilities::KEYBOARD_HEIGHT
            | Capabilities::TOUCH_DISMISS
    }

    fn listeners(&self) -> &ImeListeners {
        &self.listeners
    }

    fn is_text_input_active(&self) -> bool {
        self.session.is_active()
    }

    fn start_text_input(&self) -> Result<(), ImeError> {
        if !self.session.should_start()? {
            return Ok(());
        }

        self.host.set_confirm_title(&self.confirm_text.borrow());
        self.host.set_panel_hidden(false);
        {
            let _edits = self.edits.suppress();
            self.host.set_field_text(&self.current_result_text.borrow());
            self.host.select_all_field_text();
        }

        if let Err(err) = self.host.focus_field() {
            let _edits = self.edits.suppress();
            self.host.set_field_text("");
            self.host.set_panel_hidden(true);
            return Err(err);
        }

        self.session.activate();
        debug!("text input started");
        Ok(())
    }

    fn stop_text_input(&self) -> Result<(), ImeError> {
        if !self.session.deactivate() {
            return Ok(());
        }

        self.host.end_editing();
        let text = self.host.field_text();
        self.listeners.emit_result_text(ResultTextEvent::new(text, true));

        {
            let _edits = self.edits.suppress();
            self.host.set_field_text("");
        }
        self.host.set_panel_hidden(true);
        self.host.focus_game_view();

        debug!("text input stopped");
        Ok(())
    }

    fn virtual_keyboard_height(&self) -> u32 {
        self.keyboard.height()
    }

    fn update(&self, touches: &[TouchSample]) {
        if !self.session.is_active() {
            return;
        }

        // Taps on the confirm bar itself do not dismiss.
        let offset = self.dismiss_offset.unwrap_or(self.panel_height);
        if self.keyboard.tapped_above(&self.host, touches, offset) {
            debug!("tap above the keyboard, dismissing it");
            self.stop_from_callback();
        }
    }

    fn detach(&self) {
        if self.session.is_active() {
            self.stop_from_callback();
        }
        if self.session.mark_detached() {
            self.host.release();
            self.listeners.clear();
            debug!("confirm bar ime handler detached");
        }
    }
}
