use std::cell::Cell;
use std::ops::Range;

use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::handler::{Capabilities, TextInputHandler};
use ime_bridge_core::ime::{ImeString, TextCompositionEvent, TextInputEvent};
use ime_bridge_core::keyboard::{self, KeyCode, BACKSPACE};
use ime_bridge_core::listeners::ImeListeners;
use ime_bridge_core::session::{EditSuppression, SessionState};
use ime_bridge_core::touch::TouchSample;
use tracing::{debug, error, trace};

use crate::screen::{replace_six_per_em_space, KeyboardFrame, ScreenMetrics, INPUT_PANEL_HEIGHT};

/// The marked (uncommitted) part of the field.
///
/// Offsets are in UTF-16 code units from the start of the field, as `UITextInput` reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedText {
    pub range: Range<usize>,
    /// Start of the selected text range.
    pub selection: usize,
}

/// The field content at the time of an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub text: String,
    pub marked: Option<MarkedText>,
}

/// The invisible text field the keyboard types into.
pub trait BackwardFieldHost: ScreenMetrics {
    fn field_snapshot(&self) -> FieldSnapshot;

    fn clear_field(&self);

    /// Make the field first responder, which brings up the keyboard.
    fn focus_field(&self) -> Result<(), ImeError>;

    fn resign_field(&self);

    fn focus_game_view(&self);

    /// Remove the field and keyboard observers.
    fn release(&self) {}
}

/// IME adapter for iOS typing into an invisible field.
///
/// Committed text is reported as [`TextInputEvent`]s and removed from the field right away, so
/// the field is empty between edits. Marked text is reported as the composition. With an empty
/// field `deleteBackward` has nothing to delete, so the adapter reports it as a backspace.
pub struct BackwardFieldImeHandler<H> {
    host: H,
    listeners: ImeListeners,
    session: SessionState,
    edits: EditSuppression,
    keyboard: KeyboardFrame,
    composing: Cell<bool>,
    dismiss_offset: u32,
}

impl<H: BackwardFieldHost> BackwardFieldImeHandler<H> {
    pub fn new(host: H, attributes: ImeAttributes) -> Self {
        Self {
            host,
            listeners: ImeListeners::new(),
            session: SessionState::new(),
            edits: EditSuppression::new(),
            keyboard: KeyboardFrame::default(),
            composing: Cell::new(false),
            dismiss_offset: attributes.dismiss_offset_or(INPUT_PANEL_HEIGHT),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// `UIKeyboardWillShowNotification`, with the height of the keyboard's end frame in points.
    pub fn keyboard_will_show(&self, keyboard_height: f64) {
        if !self.session.is_detached() {
            self.keyboard.will_show(keyboard_height, self.host.screen_scale());
        }
    }

    /// `UIKeyboardWillHideNotification`.
    pub fn keyboard_will_hide(&self) {
        self.keyboard.will_hide();
    }

    /// The field's `UIControlEventEditingChanged`.
    pub fn on_field_changed(&self) {
        if self.edits.is_suppressed() || !self.session.is_active() {
            return;
        }

        let snapshot = self.host.field_snapshot();
        match snapshot.marked {
            Some(marked) => self.compose(&snapshot.text, &marked),
            None => self.commit(&snapshot.text),
        }
    }

    /// `deleteBackward`. Returns `true` if the adapter consumed it; otherwise it belongs to the
    /// field, which is the case while composing.
    pub fn on_delete_backward(&self) -> bool {
        if !self.session.is_active() || self.composing.get() {
            return false;
        }
        trace!("backspace");
        let event = TextInputEvent::new(BACKSPACE, Some(KeyCode::Backspace));
        self.listeners.emit_text_input(event);
        true
    }

    /// `textFieldShouldReturn:`. Finishes text input; returns `false` so the field does not
    /// insert a line break.
    pub fn should_return(&self) -> bool {
        if let Err(err) = self.stop_text_input() {
            error!("failed to stop text input: {err}");
        }
        false
    }

    fn compose(&self, text: &str, marked: &MarkedText) {
        let field = ImeString::from(text);
        let start = field.utf16_to_char_offset(marked.range.start);
        let end = field.utf16_to_char_offset(marked.range.end);
        let marked_text: String = text.chars().skip(start).take(end.saturating_sub(start)).collect();
        let cursor = field
            .utf16_to_char_offset(marked.selection)
            .clamp(start, end.max(start))
            - start;

        self.composing.set(!marked_text.is_empty());
        let event = TextCompositionEvent::new(replace_six_per_em_space(&marked_text), cursor);
        self.listeners.emit_text_composition(event);
    }

    fn commit(&self, text: &str) {
        self.end_composition();
        if text.is_empty() {
            return;
        }

        for c in text.chars() {
            self.listeners.emit_text_input(TextInputEvent::new(c, keyboard::key_for_char(c)));
        }
        let _edits = self.edits.suppress();
        self.host.clear_field();
    }

    fn end_composition(&self) {
        if self.composing.replace(false) {
            self.listeners.emit_text_composition(TextCompositionEvent::cleared());
        }
    }
}

impl<H: BackwardFieldHost> TextInputHandler for BackwardFieldImeHandler<H> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::COMPOSITION | Capabilities::KEYBOARD_HEIGHT | Capabilities::TOUCH_DISMISS
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

        {
            let _edits = self.edits.suppress();
            self.host.clear_field();
        }
        self.host.focus_field()?;

        self.session.activate();
        debug!("text input started");
        Ok(())
    }

    fn stop_text_input(&self) -> Result<(), ImeError> {
        if !self.session.deactivate() {
            return Ok(());
        }

        self.end_composition();
        {
            let _edits = self.edits.suppress();
            self.host.clear_field();
        }
        self.host.resign_field();
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
        if self.keyboard.tapped_above(&self.host, touches, self.dismiss_offset) {
            debug!("tap above the keyboard, dismissing it");
            if let Err(err) = self.stop_text_input() {
                error!("failed to stop text input: {err}");
            }
        }
    }

    fn detach(&self) {
        if let Err(err) = self.stop_text_input() {
            error!("failed to stop text input: {err}");
        }
        if self.session.mark_detached() {
            self.host.release();
            self.listeners.clear();
            debug!("backward field ime handler detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use ime_bridge_core::attributes::ImeAttributes;
    use ime_bridge_core::error::ImeError;
    use ime_bridge_core::handler::TextInputHandler;
    use ime_bridge_core::ime::{TextCompositionEvent, TextInputEvent};
    use ime_bridge_core::keyboard::{KeyCode, BACKSPACE};

    use super::{BackwardFieldHost, BackwardFieldImeHandler, FieldSnapshot, MarkedText};
    use crate::screen::ScreenMetrics;

    #[derive(Default)]
    struct MockField {
        snapshot: RefCell<FieldSnapshot>,
        focused: Cell<bool>,
        game_focused: Cell<bool>,
        clears: Cell<u32>,
        released: Cell<bool>,
    }

    impl ScreenMetrics for Rc<MockField> {
        fn screen_scale(&self) -> f64 {
            2.0
        }

        fn window_height(&self) -> f64 {
            667.0
        }
    }

    impl BackwardFieldHost for Rc<MockField> {
        fn field_snapshot(&self) -> FieldSnapshot {
            self.snapshot.borrow().clone()
        }

        fn clear_field(&self) {
            *self.snapshot.borrow_mut() = FieldSnapshot::default();
            self.clears.set(self.clears.get() + 1);
        }

        fn focus_field(&self) -> Result<(), ImeError> {
            self.focused.set(true);
            Ok(())
        }

        fn resign_field(&self) {
            self.focused.set(false);
        }

        fn focus_game_view(&self) {
            self.game_focused.set(true);
        }

        fn release(&self) {
            self.released.set(true);
        }
    }

    struct Recorded {
        input: Rc<RefCell<Vec<TextInputEvent>>>,
        composition: Rc<RefCell<Vec<TextCompositionEvent>>>,
    }

    fn handler() -> (Rc<MockField>, BackwardFieldImeHandler<Rc<MockField>>, Recorded) {
        let field = Rc::new(MockField::default());
        let handler = BackwardFieldImeHandler::new(field.clone(), ImeAttributes::default());
        let recorded = Recorded {
            input: Rc::new(RefCell::new(Vec::new())),
            composition: Rc::new(RefCell::new(Vec::new())),
        };
        let input = recorded.input.clone();
        handler.listeners().on_text_input(move |event| input.borrow_mut().push(*event));
        let composition = recorded.composition.clone();
        handler
            .listeners()
            .on_text_composition(move |event| composition.borrow_mut().push(event.clone()));
        (field, handler, recorded)
    }

    fn edit(
        field: &MockField,
        handler: &BackwardFieldImeHandler<Rc<MockField>>,
        text: &str,
        marked: Option<MarkedText>,
    ) {
        *field.snapshot.borrow_mut() = FieldSnapshot { text: text.to_owned(), marked };
        handler.on_field_changed();
    }

    #[test]
    fn backspace_is_synthesized() {
        let (_, handler, recorded) = handler();
        handler.start_text_input().unwrap();

        assert!(handler.on_delete_backward());
        assert_eq!(*recorded.input.borrow(), [TextInputEvent::new(
            BACKSPACE,
            Some(KeyCode::Backspace)
        )]);
        assert!(recorded.composition.borrow().is_empty());
    }

    #[test]
    fn backspace_is_left_to_the_field_while_composing_or_inactive() {
        let (field, handler, recorded) = handler();
        assert!(!handler.on_delete_backward());

        handler.start_text_input().unwrap();
        edit(&field, &handler, "に", Some(MarkedText { range: 0..1, selection: 1 }));
        assert!(!handler.on_delete_backward());
        assert!(recorded.input.borrow().is_empty());
    }

    #[test]
    fn committed_text_is_typed_and_cleared() {
        let (field, handler, recorded) = handler();
        handler.start_text_input().unwrap();
        let clears = field.clears.get();

        edit(&field, &handler, "Hi!", None);
        assert_eq!(*recorded.input.borrow(), [
            TextInputEvent::new('H', Some(KeyCode::KeyH)),
            TextInputEvent::new('i', Some(KeyCode::KeyI)),
            TextInputEvent::new('!', Some(KeyCode::Digit1)),
        ]);
        assert_eq!(field.clears.get(), clears + 1);
        assert_eq!(field.field_snapshot(), FieldSnapshot::default());
    }

    #[test]
    fn marked_text_is_the_composition() {
        let (field, handler, recorded) = handler();
        handler.start_text_input().unwrap();

        edit(&field, &handler, "k", Some(MarkedText { range: 0..1, selection: 1 }));
        edit(&field, &handler, "か", Some(MarkedText { range: 0..1, selection: 1 }));
        edit(&field, &handler, "蚊", None);

        assert_eq!(*recorded.composition.borrow(), [
            TextCompositionEvent::new("k", 1),
            TextCompositionEvent::new("か", 1),
            TextCompositionEvent::cleared(),
        ]);
        assert_eq!(*recorded.input.borrow(), [TextInputEvent::new('蚊', None)]);
    }

    #[test]
    fn marked_offsets_are_utf16() {
        let (field, handler, recorded) = handler();
        handler.start_text_input().unwrap();

        // The emoji takes two UTF-16 units.
        edit(&field, &handler, "😀ab", Some(MarkedText { range: 2..4, selection: 3 }));
        assert_eq!(*recorded.composition.borrow(), [TextCompositionEvent::new("ab", 1)]);
    }

    #[test]
    fn six_per_em_space_is_replaced_in_compositions() {
        let (field, handler, recorded) = handler();
        handler.start_text_input().unwrap();

        let text = "ni\u{2006}hon";
        edit(&field, &handler, text, Some(MarkedText { range: 0..6, selection: 6 }));
        assert_eq!(*recorded.composition.borrow(), [TextCompositionEvent::new("ni hon", 6)]);
    }

    #[test]
    fn stop_closes_the_composition() {
        let (field, handler, recorded) = handler();
        handler.start_text_input().unwrap();
        edit(&field, &handler, "ㅎ", Some(MarkedText { range: 0..1, selection: 1 }));
        handler.stop_text_input().unwrap();

        assert_eq!(recorded.composition.borrow().last(), Some(&TextCompositionEvent::cleared()));
        assert!(recorded.input.borrow().is_empty());
        assert!(!field.focused.get());
        assert!(field.game_focused.get());
    }

    #[test]
    fn return_stops_without_line_break() {
        let (_, handler, recorded) = handler();
        handler.start_text_input().unwrap();
        assert!(!handler.should_return());
        assert!(!handler.is_text_input_active());
        assert!(recorded.input.borrow().is_empty());
    }

    #[test]
    fn edits_are_ignored_while_inactive() {
        let (field, handler, recorded) = handler();
        edit(&field, &handler, "a", None);
        assert!(recorded.input.borrow().is_empty());
        assert_eq!(field.clears.get(), 0);
    }

    #[test]
    fn detach() {
        let (field, handler, _) = handler();
        handler.start_text_input().unwrap();
        handler.detach();
        assert!(field.released.get());
        assert!(!handler.is_text_input_active());
        assert!(matches!(handler.start_text_input(), Err(ImeError::Detached)));
    }
}
