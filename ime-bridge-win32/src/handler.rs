use std::cell::Cell;

use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::geometry::ImeRect;
use ime_bridge_core::handler::{Capabilities, TextInputHandler};
use ime_bridge_core::ime::{CandidateList, ImeString, TextCompositionEvent, TextInputEvent};
use ime_bridge_core::listeners::ImeListeners;
use ime_bridge_core::session::SessionState;
use ime_bridge_core::keyboard::KeyCode;
use tracing::{debug, warn};

/// The window's input method context, as driven by the Windows adapter.
pub trait ImeContextHost {
    /// Associate the window with its input context, or dissociate it so the IME stays closed.
    fn set_ime_enabled(&self, enabled: bool) -> Result<(), ImeError>;

    /// Place the candidate and composition windows so that they do not cover `rect`.
    fn set_candidate_area(&self, rect: ImeRect) -> Result<(), ImeError>;

    /// The key producing `c` on the active keyboard layout.
    fn key_for(&self, c: char) -> Option<KeyCode>;

    /// Drop references to the window.
    fn release(&self) {}
}

/// IME adapter for Windows.
///
/// Text input goes through the system IME attached to the game window; there is no on-screen
/// keyboard and no confirm bar. Committed text is reported character by character, the
/// composition together with the IME's candidate list.
pub struct Win32ImeHandler<C> {
    host: C,
    listeners: ImeListeners,
    session: SessionState,
    high_surrogate: Cell<Option<u16>>,
    composing: Cell<bool>,
    show_os_ime_window: bool,
}

impl<C: ImeContextHost> Win32ImeHandler<C> {
    pub fn new(host: C, attributes: ImeAttributes) -> Self {
        Self {
            host,
            listeners: ImeListeners::new(),
            session: SessionState::new(),
            high_surrogate: Cell::new(None),
            composing: Cell::new(false),
            show_os_ime_window: attributes.show_os_ime_window,
        }
    }

    pub fn host(&self) -> &C {
        &self.host
    }

    /// Whether the OS draws its composition and candidate windows.
    pub fn show_os_ime_window(&self) -> bool {
        self.show_os_ime_window
    }

    /// A UTF-16 code unit delivered by `WM_CHAR`.
    ///
    /// Characters outside the Basic Multilingual Plane arrive as two messages and are reported
    /// once both halves were seen. They have no key.
    pub fn on_char(&self, unit: u16) {
        if !self.session.is_active() {
            return;
        }

        match unit {
            0xD800..=0xDBFF => {
                if let Some(orphan) = self.high_surrogate.replace(Some(unit)) {
                    warn!("dropping unpaired high surrogate {orphan:#06x}");
                }
            },
            0xDC00..=0xDFFF => match self.high_surrogate.take() {
                Some(high) => {
                    let c = char::decode_utf16([high, unit])
                        .next()
                        .and_then(Result::ok)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    self.listeners.emit_text_input(TextInputEvent::new(c, None));
                },
                None => warn!("dropping unpaired low surrogate {unit:#06x}"),
            },
            _ => {
                if let Some(orphan) = self.high_surrogate.take() {
                    warn!("dropping unpaired high surrogate {orphan:#06x}");
                }
                // Not a surrogate, so this is always a valid scalar value.
                if let Some(c) = char::from_u32(u32::from(unit)) {
                    self.emit_char(c);
                }
            },
        }
    }

    /// Text committed by the IME.
    pub fn on_result(&self, text: &str) {
        if !self.session.is_active() {
            return;
        }
        for c in text.chars() {
            self.emit_char(c);
        }
    }

    /// The composition string changed. `cursor` is in chars.
    pub fn on_composition(
        &self,
        text: ImeString,
        cursor: usize,
        candidates: Option<CandidateList>,
    ) {
        if !self.session.is_active() {
            return;
        }
        self.composing.set(!text.is_empty());
        let event = TextCompositionEvent { text, cursor, candidates };
        self.listeners.emit_text_composition(event);
    }

    /// The IME closed the composition, either after committing it or cancelling it.
    pub fn on_composition_end(&self) {
        if self.composing.replace(false) {
            self.listeners.emit_text_composition(TextCompositionEvent::cleared());
        }
    }

    fn emit_char(&self, c: char) {
        let key = if c.len_utf16() == 1 {
            self.host.key_for(c)
        } else {
            None
        };
        self.listeners.emit_text_input(TextInputEvent::new(c, key));
    }
}

impl<C: ImeContextHost> TextInputHandler for Win32ImeHandler<C> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::COMPOSITION | Capabilities::CANDIDATE_LIST | Capabilities::TEXT_INPUT_RECT
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
        self.host.set_ime_enabled(true)?;
        self.session.activate();
        debug!("text input started");
        Ok(())
    }

    fn stop_text_input(&self) -> Result<(), ImeError> {
        if !self.session.deactivate() {
            return Ok(());
        }
        self.high_surrogate.set(None);
        self.on_composition_end();
        debug!("text input stopped");
        self.host.set_ime_enabled(false)
    }

    fn set_text_input_rect(&self, rect: ImeRect) -> Result<(), ImeError> {
        if !self.session.is_active() {
            return Ok(());
        }
        self.host.set_candidate_area(rect)
    }

    fn virtual_keyboard_height(&self) -> u32 {
        0
    }

    fn detach(&self) {
        if self.session.is_active() {
            if let Err(err) = self.stop_text_input() {
                tracing::error!("failed to stop text input: {err}");
            }
        }
        if self.session.mark_detached() {
            self.host.release();
            self.listeners.clear();
            debug!("win32 ime handler detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use ime_bridge_core::attributes::ImeAttributes;
    use ime_bridge_core::error::ImeError;
    use ime_bridge_core::geometry::ImeRect;
    use ime_bridge_core::handler::TextInputHandler;
    use ime_bridge_core::ime::{ImeString, TextCompositionEvent, TextInputEvent};
    use ime_bridge_core::keyboard::{self, KeyCode};

    use super::{ImeContextHost, Win32ImeHandler};
    use crate::candidates::parse_candidate_list;
    use crate::candidates::tests::candidate_buffer;

    #[derive(Default)]
    struct MockContext {
        enabled: Cell<bool>,
        areas: RefCell<Vec<ImeRect>>,
        remapped: Cell<Option<(char, KeyCode)>>,
    }

    impl ImeContextHost for Rc<MockContext> {
        fn set_ime_enabled(&self, enabled: bool) -> Result<(), ImeError> {
            self.enabled.set(enabled);
            Ok(())
        }

        fn set_candidate_area(&self, rect: ImeRect) -> Result<(), ImeError> {
            self.areas.borrow_mut().push(rect);
            Ok(())
        }

        fn key_for(&self, c: char) -> Option<KeyCode> {
            match self.remapped.get() {
                Some((remapped, key)) if remapped == c => Some(key),
                _ => keyboard::key_for_char(c),
            }
        }
    }

    struct Recorded {
        input: Rc<RefCell<Vec<TextInputEvent>>>,
        composition: Rc<RefCell<Vec<TextCompositionEvent>>>,
    }

    fn handler() -> (Rc<MockContext>, Win32ImeHandler<Rc<MockContext>>, Recorded) {
        let context = Rc::new(MockContext::default());
        let handler = Win32ImeHandler::new(context.clone(), ImeAttributes::default());
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
        (context, handler, recorded)
    }

    #[test]
    fn start_and_stop_toggle_the_context() {
        let (context, handler, _) = handler();
        handler.start_text_input().unwrap();
        handler.start_text_input().unwrap();
        assert!(context.enabled.get());
        assert!(handler.is_text_input_active());

        handler.stop_text_input().unwrap();
        assert!(!context.enabled.get());
        assert!(!handler.is_text_input_active());
        assert_eq!(handler.virtual_keyboard_height(), 0);
    }

    #[test]
    fn chars_map_to_keys() {
        let (_, handler, recorded) = handler();
        handler.start_text_input().unwrap();
        for unit in "a1".encode_utf16() {
            handler.on_char(unit);
        }
        handler.on_char('é' as u16);

        assert_eq!(*recorded.input.borrow(), [
            TextInputEvent::new('a', Some(KeyCode::KeyA)),
            TextInputEvent::new('1', Some(KeyCode::Digit1)),
            TextInputEvent::new('é', None),
        ]);
    }

    #[test]
    fn key_comes_from_the_active_layout() {
        let (context, handler, recorded) = handler();
        // AZERTY.
        context.remapped.set(Some(('a', KeyCode::KeyQ)));
        handler.start_text_input().unwrap();
        handler.on_char('a' as u16);

        assert_eq!(*recorded.input.borrow(), [TextInputEvent::new('a', Some(KeyCode::KeyQ))]);
    }

    #[test]
    fn surrogate_pairs_are_joined_without_key() {
        let (_, handler, recorded) = handler();
        handler.start_text_input().unwrap();
        for unit in "😀".encode_utf16() {
            handler.on_char(unit);
        }
        // Lone low surrogate.
        handler.on_char(0xDC00);

        assert_eq!(*recorded.input.borrow(), [TextInputEvent::new('😀', None)]);
    }

    #[test]
    fn input_is_ignored_while_inactive() {
        let (_, handler, recorded) = handler();
        handler.on_char('a' as u16);
        handler.on_result("abc");
        handler.on_composition(ImeString::from("か"), 1, None);
        assert!(recorded.input.borrow().is_empty());
        assert!(recorded.composition.borrow().is_empty());
    }

    #[test]
    fn composition_with_candidates_then_result() {
        let (_, handler, recorded) = handler();
        handler.start_text_input().unwrap();

        let candidates = parse_candidate_list(&candidate_buffer(&["漢字", "感じ"], 0, 0, 9));
        handler.on_composition(ImeString::from("かんじ"), 3, candidates.clone());
        handler.on_result("漢字");
        handler.on_composition_end();
        // A second end notification has nothing to clear.
        handler.on_composition_end();

        let composition = recorded.composition.borrow();
        assert_eq!(composition.len(), 2);
        assert_eq!(composition[0].text, "かんじ");
        assert_eq!(composition[0].cursor, 3);
        assert_eq!(composition[0].candidates, candidates);
        assert_eq!(composition[1], TextCompositionEvent::cleared());

        let input = recorded.input.borrow();
        assert_eq!(input.iter().map(|event| event.character).collect::<String>(), "漢字");
        assert!(input.iter().all(|event| event.key.is_none()));
    }

    #[test]
    fn stop_clears_pending_composition() {
        let (_, handler, recorded) = handler();
        handler.start_text_input().unwrap();
        handler.on_composition(ImeString::from("ㅎ"), 1, None);
        handler.stop_text_input().unwrap();

        let composition = recorded.composition.borrow();
        assert_eq!(composition.last(), Some(&TextCompositionEvent::cleared()));
    }

    #[test]
    fn text_input_rect_requires_active_session() {
        let (context, handler, _) = handler();
        let rect = ImeRect::new(100, 200, 10, 20);
        handler.set_text_input_rect(rect).unwrap();
        assert!(context.areas.borrow().is_empty());

        handler.start_text_input().unwrap();
        handler.set_text_input_rect(rect).unwrap();
        assert_eq!(*context.areas.borrow(), [rect]);
    }

    #[test]
    fn detach_disables_the_context() {
        let (context, handler, _) = handler();
        handler.start_text_input().unwrap();
        handler.detach();
        assert!(!context.enabled.get());
        assert!(matches!(handler.start_text_input(), Err(ImeError::Detached)));
    }
}
