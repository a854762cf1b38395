use std::cell::RefCell;

use dpi::PhysicalSize;
use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::handler::{Capabilities, TextInputHandler};
use ime_bridge_core::ime::ResultTextEvent;
use ime_bridge_core::listeners::ImeListeners;
use ime_bridge_core::session::{EditSuppression, SessionState};
use ime_bridge_core::touch::{self, TouchSample};
use tracing::{debug, error, trace};

/// Default distance in pixels above the keyboard under which taps do not dismiss it.
pub const KEYBOARD_HIDE_OFFSET: u32 = 80;

/// The activity-side widgets the Android adapter drives.
///
/// The editor is a single-line text field whose content the soft keyboard edits.
pub trait SoftInputHost {
    fn show_soft_input(&self) -> Result<(), ImeError>;

    fn hide_soft_input(&self) -> Result<(), ImeError>;

    /// Replace the editor content, optionally selecting all of it.
    fn set_editor_text(&self, text: &str, select_all: bool);

    fn editor_text(&self) -> String;

    fn screen_size(&self) -> PhysicalSize<u32>;

    /// Height of the soft keyboard in pixels, `0` when hidden.
    fn keyboard_height(&self) -> u32;

    /// Give input focus back to the game surface.
    fn request_game_focus(&self);

    /// The confirm bar moved and must be laid out again.
    fn request_layout(&self);

    /// Drop references to native widgets and listeners.
    fn release(&self) {}
}

/// IME action reported by the editor, for example when the keyboard's action key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EditorAction {
    Done,
    Go,
    Next,
    Search,
    Send,
    Unspecified,
}

/// State of the confirm bar: the text field and the confirm button docked above the keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPanel {
    pub visible: bool,
    /// Vertical offset of the panel's top edge, in pixels from the top of the screen.
    pub translation_y: i32,
    pub measured_height: u32,
    pub confirm_text: String,
}

/// IME adapter for Android.
///
/// Text is entered in an editor docked above the soft keyboard together with a confirm button.
/// The adapter reports every change of the editor content as a non-final
/// [`ResultTextEvent`], and the content at the time the session stops as the final one.
/// Composition is left to the OS input method and never reported.
pub struct AndroidImeHandler<H> {
    host: H,
    listeners: ImeListeners,
    session: SessionState,
    edits: EditSuppression,
    panel: RefCell<InputPanel>,
    current_result_text: RefCell<String>,
    dismiss_offset: u32,
}

impl<H: SoftInputHost> AndroidImeHandler<H> {
    pub fn new(host: H, attributes: ImeAttributes) -> Self {
        let panel = InputPanel {
            visible: false,
            translation_y: 0,
            measured_height: attributes.input_panel_height,
            confirm_text: attributes.confirm_text,
        };
        Self {
            host,
            listeners: ImeListeners::new(),
            session: SessionState::new(),
            edits: EditSuppression::new(),
            panel: RefCell::new(panel),
            current_result_text: RefCell::new(attributes.initial_text),
            dismiss_offset: attributes.dismiss_offset.unwrap_or(KEYBOARD_HIDE_OFFSET),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// A copy of the confirm bar state, for drawing it.
    pub fn input_panel(&self) -> InputPanel {
        self.panel.borrow().clone()
    }

    /// Record the height the confirm bar was laid out with.
    pub fn set_input_panel_height(&self, measured_height: u32) {
        self.panel.borrow_mut().measured_height = measured_height;
    }

    pub fn set_confirm_text(&self, confirm_text: impl Into<String>) {
        self.panel.borrow_mut().confirm_text = confirm_text.into();
    }

    /// The text the editor is seeded with when text input starts.
    pub fn current_result_text(&self) -> String {
        self.current_result_text.borrow().clone()
    }

    pub fn set_current_result_text(&self, text: impl Into<String>) {
        *self.current_result_text.borrow_mut() = text.into();
    }

    /// The editor content changed.
    pub fn on_editor_text_changed(&self) {
        if self.edits.is_suppressed() || !self.session.is_active() {
            return;
        }
        let text = self.host.editor_text();
        self.listeners.emit_result_text(ResultTextEvent::new(text, false));
    }

    /// The editor reported an IME action. Always consumes the action.
    pub fn on_editor_action(&self, action: EditorAction) -> bool {
        trace!(?action, "editor action");
        if action == EditorAction::Done {
            self.stop_from_callback();
        }
        true
    }

    /// The confirm button was clicked.
    pub fn on_confirm_clicked(&self) {
        self.stop_from_callback();
    }

    pub fn on_soft_keyboard_shown(&self) {
        if self.session.is_detached() {
            return;
        }
        let keyboard_height = self.host.keyboard_height();
        self.move_panel_above(keyboard_height);
    }

    pub fn on_soft_keyboard_hidden(&self) {
        if !self.session.is_active() {
            return;
        }
        self.move_panel_above(0);
    }

    fn move_panel_above(&self, keyboard_height: u32) {
        let screen = self.host.screen_size();
        let changed = {
            let mut panel = self.panel.borrow_mut();
            let translation_y =
                screen.height as i32 - panel.measured_height as i32 - keyboard_height as i32;
            let changed = panel.translation_y != translation_y;
            panel.translation_y = translation_y;
            changed
        };
        if changed {
            self.host.request_layout();
        }
    }

    fn stop_from_callback(&self) {
        if let Err(err) = self.stop_text_input() {
            error!("failed to stop text input: {err}");
        }
    }
}

impl<H: SoftInputHost> TextInputHandler for AndroidImeHandler<H> {
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

        self.panel.borrow_mut().visible = true;
        let seed = self.current_result_text();
        {
            let _edits = self.edits.suppress();
            self.host.set_editor_text(&seed, true);
        }

        if let Err(err) = self.host.show_soft_input() {
            self.panel.borrow_mut().visible = false;
            let _edits = self.edits.suppress();
            self.host.set_editor_text("", false);
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

        let text = self.host.editor_text();
        self.listeners.emit_result_text(ResultTextEvent::new(text, true));

        {
            let _edits = self.edits.suppress();
            self.host.set_editor_text("", false);
        }
        self.panel.borrow_mut().visible = false;
        let hidden = self.host.hide_soft_input();
        self.host.request_game_focus();

        debug!("text input stopped");
        hidden
    }

    fn virtual_keyboard_height(&self) -> u32 {
        self.host.keyboard_height()
    }

    fn update(&self, touches: &[TouchSample]) {
        if !self.session.is_active() {
            return;
        }

        let screen = self.host.screen_size();
        let keyboard_top = f64::from(screen.height) - f64::from(self.host.keyboard_height());
        if touch::pressed_above(touches, keyboard_top - f64::from(self.dismiss_offset)) {
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
            debug!("android ime handler detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use dpi::{PhysicalPosition, PhysicalSize};
    use ime_bridge_core::attributes::ImeAttributes;
    use ime_bridge_core::error::ImeError;
    use ime_bridge_core::handler::TextInputHandler;
    use ime_bridge_core::ime::ResultTextEvent;
    use ime_bridge_core::touch::{TouchPhase, TouchSample};

    use super::{AndroidImeHandler, EditorAction, SoftInputHost};

    #[derive(Default)]
    struct MockActivity {
        text: RefCell<String>,
        select_all: Cell<bool>,
        keyboard_height: Cell<u32>,
        soft_input_shown: Cell<bool>,
        layout_requests: Cell<u32>,
        game_focus_requests: Cell<u32>,
        released: Cell<bool>,
        refuse_soft_input: Cell<bool>,
    }

    impl SoftInputHost for Rc<MockActivity> {
        fn show_soft_input(&self) -> Result<(), ImeError> {
            if self.refuse_soft_input.get() {
                return Err(ime_bridge_core::os_error!("no window token").into());
            }
            self.soft_input_shown.set(true);
            Ok(())
        }

        fn hide_soft_input(&self) -> Result<(), ImeError> {
            self.soft_input_shown.set(false);
            Ok(())
        }

        fn set_editor_text(&self, text: &str, select_all: bool) {
            *self.text.borrow_mut() = text.to_owned();
            self.select_all.set(select_all);
        }

        fn editor_text(&self) -> String {
            self.text.borrow().clone()
        }

        fn screen_size(&self) -> PhysicalSize<u32> {
            PhysicalSize::new(1080, 1920)
        }

        fn keyboard_height(&self) -> u32 {
            self.keyboard_height.get()
        }

        fn request_game_focus(&self) {
            self.game_focus_requests.set(self.game_focus_requests.get() + 1);
        }

        fn request_layout(&self) {
            self.layout_requests.set(self.layout_requests.get() + 1);
        }

        fn release(&self) {
            self.released.set(true);
        }
    }

    fn handler() -> (Rc<MockActivity>, AndroidImeHandler<Rc<MockActivity>>) {
        let activity = Rc::new(MockActivity::default());
        let handler = AndroidImeHandler::new(activity.clone(), ImeAttributes::default());
        (activity, handler)
    }

    fn type_text(activity: &MockActivity, handler: &AndroidImeHandler<Rc<MockActivity>>, s: &str) {
        for c in s.chars() {
            activity.text.borrow_mut().push(c);
            handler.on_editor_text_changed();
        }
    }

    fn record_results(
        handler: &AndroidImeHandler<Rc<MockActivity>>,
    ) -> Rc<RefCell<Vec<(String, bool)>>> {
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = results.clone();
        handler.listeners().on_result_text_updated(move |event| {
            sink.borrow_mut().push((event.text.to_string(), event.is_final))
        });
        results
    }

    #[test]
    fn start_seeds_editor_and_shows_keyboard() {
        let (activity, handler) = handler();
        handler.set_current_result_text("Link");
        handler.start_text_input().unwrap();

        assert!(handler.is_text_input_active());
        assert!(activity.soft_input_shown.get());
        assert_eq!(*activity.text.borrow(), "Link");
        assert!(activity.select_all.get());
        assert!(handler.input_panel().visible);
    }

    #[test]
    fn typing_then_stopping_reports_each_change_and_one_final() {
        let (activity, handler) = handler();
        let results = record_results(&handler);

        handler.start_text_input().unwrap();
        type_text(&activity, &handler, "hello");
        handler.stop_text_input().unwrap();

        let results = results.borrow();
        assert_eq!(results.len(), 6);
        assert_eq!(results.iter().filter(|(_, is_final)| !is_final).count(), 5);
        assert_eq!(results[4], ("hello".to_owned(), false));
        assert_eq!(results[5], ("hello".to_owned(), true));
        assert!(activity.text.borrow().is_empty());
        assert!(!activity.soft_input_shown.get());
        assert_eq!(activity.game_focus_requests.get(), 1);
        assert!(!handler.input_panel().visible);
    }

    #[test]
    fn listener_stopping_on_enter_receives_the_final_text() {
        let (activity, handler) = handler();
        let handler = Rc::new(handler);
        let finals = Rc::new(RefCell::new(Vec::new()));
        {
            let weak = Rc::downgrade(&handler);
            let finals = finals.clone();
            handler.listeners().on_result_text_updated(move |event| {
                if event.is_final {
                    finals.borrow_mut().push(event.text.to_string());
                } else if event.text.as_str().ends_with('\n') {
                    if let Some(handler) = weak.upgrade() {
                        handler.stop_text_input().unwrap();
                    }
                }
            });
        }

        handler.start_text_input().unwrap();
        type_text(&activity, &handler, "go\n");

        assert!(!handler.is_text_input_active());
        assert_eq!(*finals.borrow(), ["go\n"]);
        assert!(activity.text.borrow().is_empty());
    }

    #[test]
    fn double_start_and_stop_are_no_ops() {
        let (activity, handler) = handler();
        let results = record_results(&handler);

        handler.stop_text_input().unwrap();
        assert!(results.borrow().is_empty());
        assert_eq!(activity.game_focus_requests.get(), 0);

        handler.start_text_input().unwrap();
        activity.text.borrow_mut().push_str("abc");
        handler.start_text_input().unwrap();
        assert_eq!(*activity.text.borrow(), "abc");

        handler.stop_text_input().unwrap();
        handler.stop_text_input().unwrap();
        assert_eq!(results.borrow().len(), 1);
        assert!(!handler.is_text_input_active());
    }

    #[test]
    fn refused_soft_input_leaves_session_inactive() {
        let (activity, handler) = handler();
        activity.refuse_soft_input.set(true);

        assert!(matches!(handler.start_text_input(), Err(ImeError::Os(_))));
        assert!(!handler.is_text_input_active());
        assert!(!handler.input_panel().visible);
    }

    #[test]
    fn done_action_and_confirm_button_stop() {
        let (_activity, handler) = handler();
        handler.start_text_input().unwrap();
        assert!(handler.on_editor_action(EditorAction::Next));
        assert!(handler.is_text_input_active());
        assert!(handler.on_editor_action(EditorAction::Done));
        assert!(!handler.is_text_input_active());

        handler.start_text_input().unwrap();
        handler.on_confirm_clicked();
        assert!(!handler.is_text_input_active());
    }

    #[test]
    fn panel_follows_keyboard() {
        let (activity, handler) = handler();
        handler.set_input_panel_height(120);
        handler.start_text_input().unwrap();

        activity.keyboard_height.set(800);
        handler.on_soft_keyboard_shown();
        assert_eq!(handler.input_panel().translation_y, 1920 - 120 - 800);
        assert_eq!(activity.layout_requests.get(), 1);

        // Unchanged position does not request another layout.
        handler.on_soft_keyboard_shown();
        assert_eq!(activity.layout_requests.get(), 1);

        activity.keyboard_height.set(0);
        handler.on_soft_keyboard_hidden();
        assert_eq!(handler.input_panel().translation_y, 1920 - 120);
        assert_eq!(activity.layout_requests.get(), 2);

        handler.stop_text_input().unwrap();
        handler.on_soft_keyboard_hidden();
        assert_eq!(activity.layout_requests.get(), 2);
    }

    #[test]
    fn tap_above_keyboard_dismisses() {
        let (activity, handler) = handler();
        activity.keyboard_height.set(800);
        handler.start_text_input().unwrap();

        // Keyboard top is at 1120, the dismiss line at 1040.
        let below = TouchSample::new(0, PhysicalPosition::new(10.0, 1040.0), TouchPhase::Pressed);
        handler.update(&[below]);
        assert!(handler.is_text_input_active());

        let held = TouchSample::new(1, PhysicalPosition::new(10.0, 100.0), TouchPhase::Moved);
        handler.update(&[held]);
        assert!(handler.is_text_input_active());

        let above = TouchSample::new(2, PhysicalPosition::new(10.0, 1039.0), TouchPhase::Pressed);
        handler.update(&[above, above]);
        assert!(!handler.is_text_input_active());
        assert_eq!(activity.game_focus_requests.get(), 1);
    }

    #[test]
    fn detach_stops_and_releases() {
        let (activity, handler) = handler();
        let results = record_results(&handler);
        handler.start_text_input().unwrap();
        handler.detach();

        assert!(activity.released.get());
        assert_eq!(results.borrow().as_slice(), &[(String::new(), true)]);
        assert!(matches!(handler.start_text_input(), Err(ImeError::Detached)));

        // Listeners were dropped with the native widgets.
        handler.listeners().emit_result_text(ResultTextEvent::new("late", false));
        assert_eq!(results.borrow().len(), 1);
    }
}
