//! Registration and synchronous dispatch of the three notification channels.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::ime::{ResultTextEvent, TextCompositionEvent, TextInputEvent};

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

struct Channel<E> {
    listeners: RefCell<Vec<(ListenerId, Callback<E>)>>,
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self { listeners: RefCell::new(Vec::new()) }
    }
}

impl<E> Channel<E> {
    fn add(&self, id: ListenerId, callback: Callback<E>) {
        self.listeners.borrow_mut().push((id, callback));
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Invoke every listener registered at the time of the call.
    ///
    /// The list itself is not borrowed while listeners run, so they may register, remove, or
    /// emit further events. A nested emission reaches every listener, including the ones still
    /// running further up the stack.
    fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> =
            self.listeners.borrow().iter().map(|(_, callback)| callback.clone()).collect();
        for callback in snapshot {
            callback(event);
        }
    }
}

/// The engine-facing notification channels of an IME adapter.
///
/// All listeners run synchronously on the thread that triggered the notification, which is the
/// platform UI thread, and may be called from inside native toolkit callbacks.
///
/// A listener that calls back into the adapter, for example to stop text input, is called again
/// for the events that call raises before it returns. Listeners keep their state in cells.
#[derive(Default)]
pub struct ImeListeners {
    next_id: Cell<u64>,
    text_input: Channel<TextInputEvent>,
    text_composition: Channel<TextCompositionEvent>,
    result_text: Channel<ResultTextEvent>,
}

impl fmt::Debug for ImeListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImeListeners")
            .field("text_input", &self.text_input.len())
            .field("text_composition", &self.text_composition.len())
            .field("result_text", &self.result_text.len())
            .finish()
    }
}

impl ImeListeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ListenerId(id)
    }

    /// Called once per character accepted by the input service.
    pub fn on_text_input(&self, listener: impl Fn(&TextInputEvent) + 'static) -> ListenerId {
        let id = self.next_id();
        self.text_input.add(id, Rc::new(listener));
        id
    }

    /// Called whenever the uncommitted composition changes.
    pub fn on_text_composition(
        &self,
        listener: impl Fn(&TextCompositionEvent) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.text_composition.add(id, Rc::new(listener));
        id
    }

    /// Called whenever the confirm bar text field changes, and once more when the session stops.
    pub fn on_result_text_updated(
        &self,
        listener: impl Fn(&ResultTextEvent) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.result_text.add(id, Rc::new(listener));
        id
    }

    /// Remove a listener from whichever channel it was registered on.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.text_input.remove(id)
            || self.text_composition.remove(id)
            || self.result_text.remove(id)
    }

    pub fn clear(&self) {
        self.text_input.clear();
        self.text_composition.clear();
        self.result_text.clear();
    }

    pub fn emit_text_input(&self, event: TextInputEvent) {
        tracing::trace!(?event, "text input");
        self.text_input.emit(&event);
    }

    pub fn emit_text_composition(&self, event: TextCompositionEvent) {
        tracing::trace!(?event, "text composition");
        self.text_composition.emit(&event);
    }

    pub fn emit_result_text(&self, event: ResultTextEvent) {
        tracing::trace!(?event, "result text updated");
        self.result_text.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::ImeListeners;
    use crate::ime::{ResultTextEvent, TextInputEvent};

    #[test]
    fn listeners_run_in_registration_order() {
        let listeners = ImeListeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = log.clone();
            listeners.on_text_input(move |event| log.borrow_mut().push((tag, event.character)));
        }

        listeners.emit_text_input(TextInputEvent::new('x', None));
        assert_eq!(*log.borrow(), [("first", 'x'), ("second", 'x')]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let listeners = ImeListeners::new();
        let calls = Rc::new(RefCell::new(0));
        let id = {
            let calls = calls.clone();
            listeners.on_result_text_updated(move |_| *calls.borrow_mut() += 1)
        };

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.emit_result_text(ResultTextEvent::new("a", false));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn nested_emission_reaches_every_listener() {
        let listeners = Rc::new(ImeListeners::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        {
            let inner = Rc::downgrade(&listeners);
            let seen = seen.clone();
            listeners.on_result_text_updated(move |event| {
                seen.borrow_mut().push(("outer", event.is_final));
                if !event.is_final {
                    if let Some(listeners) = inner.upgrade() {
                        listeners.emit_result_text(ResultTextEvent::new("done", true));
                    }
                }
            });
        }
        {
            let seen = seen.clone();
            listeners.on_result_text_updated(move |event| {
                seen.borrow_mut().push(("observer", event.is_final));
            });
        }

        listeners.emit_result_text(ResultTextEvent::new("typing", false));
        assert_eq!(*seen.borrow(), [
            ("outer", false),
            ("outer", true),
            ("observer", true),
            ("observer", false)
        ]);
    }
}
