//! Binding of the Android adapter to a `GameActivity` through `android-activity`.
//!
//! The activity's `GameTextInput` editor plays the part of the confirm bar text field, the
//! engine draws the bar itself from [`AndroidImeHandler::input_panel`].

use android_activity::input::{
    InputEvent, KeyAction, Keycode, MotionAction, TextInputState, TextSpan,
};
use android_activity::{AndroidApp, InputStatus, MainEvent};
use dpi::{PhysicalPosition, PhysicalSize};
use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::handler::TextInputHandler;
use ime_bridge_core::os_error;
use ime_bridge_core::touch::TouchPanel;
use tracing::trace;

use crate::handler::{AndroidImeHandler, EditorAction, SoftInputHost};

/// [`SoftInputHost`] backed by the activity's soft input and text input state.
#[derive(Debug)]
pub struct GameActivityHost {
    app: AndroidApp,
}

impl GameActivityHost {
    pub fn new(app: AndroidApp) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &AndroidApp {
        &self.app
    }
}

impl SoftInputHost for GameActivityHost {
    fn show_soft_input(&self) -> Result<(), ImeError> {
        if self.app.native_window().is_none() {
            return Err(os_error!("the activity has no native window").into());
        }
        self.app.show_soft_input(true);
        Ok(())
    }

    fn hide_soft_input(&self) -> Result<(), ImeError> {
        self.app.hide_soft_input(true);
        Ok(())
    }

    fn set_editor_text(&self, text: &str, select_all: bool) {
        let len = text.chars().count();
        let start = if select_all { 0 } else { len };
        self.app.set_text_input_state(TextInputState {
            text: text.to_owned(),
            selection: TextSpan { start, end: len },
            compose_region: None,
        });
    }

    fn editor_text(&self) -> String {
        self.app.text_input_state().text
    }

    fn screen_size(&self) -> PhysicalSize<u32> {
        self.app
            .native_window()
            .map(|window| PhysicalSize::new(window.width() as u32, window.height() as u32))
            .unwrap_or_default()
    }

    /// The part of the window below the content rect, which the soft keyboard covers while it is
    /// shown.
    fn keyboard_height(&self) -> u32 {
        let screen = self.screen_size();
        let content = self.app.content_rect();
        (screen.height as i32 - content.bottom).max(0) as u32
    }

    fn request_game_focus(&self) {}

    fn request_layout(&self) {}
}

/// Create the adapter for the activity.
pub fn new_handler(
    app: AndroidApp,
    attributes: ImeAttributes,
) -> AndroidImeHandler<GameActivityHost> {
    AndroidImeHandler::new(GameActivityHost::new(app), attributes)
}

/// Forward a lifecycle event; keyboard visibility changes surface as content rect changes.
pub fn handle_main_event(handler: &AndroidImeHandler<GameActivityHost>, event: &MainEvent<'_>) {
    if let MainEvent::ContentRectChanged { .. } | MainEvent::InsetsChanged { .. } = event {
        if handler.host().keyboard_height() > 0 {
            handler.on_soft_keyboard_shown();
        } else {
            handler.on_soft_keyboard_hidden();
        }
    }
}

/// Forward an input event to the adapter and the touch panel.
pub fn handle_input_event(
    handler: &AndroidImeHandler<GameActivityHost>,
    touches: &mut TouchPanel,
    event: &InputEvent<'_>,
) -> InputStatus {
    match event {
        InputEvent::TextEvent(state) => {
            trace!(text = %state.text, "text input state changed");
            handler.on_editor_text_changed();
            InputStatus::Handled
        },
        InputEvent::KeyEvent(key)
            if handler.is_text_input_active() && key.key_code() == Keycode::Enter =>
        {
            if key.action() == KeyAction::Up {
                handler.on_editor_action(EditorAction::Done);
            }
            InputStatus::Handled
        },
        InputEvent::MotionEvent(motion) => {
            let position = |index: usize| {
                let pointer = motion.pointer_at_index(index);
                let location = PhysicalPosition::new(pointer.x() as f64, pointer.y() as f64);
                (pointer.pointer_id() as u64, location)
            };
            match motion.action() {
                MotionAction::Down | MotionAction::PointerDown => {
                    let (id, location) = position(motion.pointer_index());
                    touches.touch_down(id, location);
                },
                MotionAction::Up | MotionAction::PointerUp => {
                    let (id, location) = position(motion.pointer_index());
                    touches.touch_up(id, location);
                },
                MotionAction::Move => {
                    for index in 0..motion.pointer_count() {
                        let (id, location) = position(index);
                        touches.touch_moved(id, location);
                    }
                },
                MotionAction::Cancel => {
                    for index in 0..motion.pointer_count() {
                        let (id, location) = position(index);
                        touches.touch_up(id, location);
                    }
                },
                _ => {},
            }
            InputStatus::Unhandled
        },
        _ => InputStatus::Unhandled,
    }
}
