use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::os_error;
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2::{define_class, msg_send, sel, DefinedClass, MainThreadMarker, Message};
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_foundation::{NSObject, NSObjectProtocol, NSString};
use objc2_ui_kit::{
    UIControl, UIControlEvents, UIKeyboardWillHideNotification, UIKeyboardWillShowNotification,
    UIResponder, UITextAutocapitalizationType, UITextAutocorrectionType, UITextField,
    UITextFieldDelegate, UITextInput, UITextInputTraits, UITextPosition, UITextSpellCheckingType,
    UIView,
};
use tracing::debug;

use super::notification::{keyboard_end_height, Observer};
use crate::backward_field::{
    BackwardFieldHost, BackwardFieldImeHandler, FieldSnapshot, MarkedText,
};
use crate::screen::ScreenMetrics;

define_class!(
    #[unsafe(super(UITextField, UIControl, UIView, UIResponder, NSObject))]
    #[name = "ImeBridgeBackwardTextField"]
    #[ivars = Weak<BackwardFieldImeHandler<UIKitBackwardField>>]
    struct BackwardTextField;

    impl BackwardTextField {
        #[unsafe(method(deleteBackward))]
        fn delete_backward(&self) {
            let consumed =
                self.ivars().upgrade().is_some_and(|handler| handler.on_delete_backward());
            if !consumed {
                let _: () = unsafe { msg_send![super(self), deleteBackward] };
            }
        }

        #[unsafe(method(editingChanged:))]
        fn editing_changed(&self, _sender: &UITextField) {
            if let Some(handler) = self.ivars().upgrade() {
                handler.on_field_changed();
            }
        }
    }

    unsafe impl NSObjectProtocol for BackwardTextField {}

    unsafe impl UITextFieldDelegate for BackwardTextField {
        #[unsafe(method(textFieldShouldReturn:))]
        fn text_field_should_return(&self, _text_field: &UITextField) -> bool {
            self.ivars().upgrade().map_or(false, |handler| handler.should_return())
        }
    }
);

impl BackwardTextField {
    fn new(
        mtm: MainThreadMarker,
        handler: Weak<BackwardFieldImeHandler<UIKitBackwardField>>,
    ) -> Retained<Self> {
        // Hidden views cannot become first responder, so the field is tiny and nearly
        // transparent instead.
        let frame = CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(1.0, 1.0));
        let this = mtm.alloc::<Self>().set_ivars(handler);
        let this: Retained<Self> = unsafe { msg_send![super(this), initWithFrame: frame] };

        this.setAlpha(0.01);
        unsafe {
            this.setAutocorrectionType(UITextAutocorrectionType::No);
            this.setSpellCheckingType(UITextSpellCheckingType::No);
            this.setAutocapitalizationType(UITextAutocapitalizationType::None);
        }

        let target: &AnyObject = &this;
        unsafe {
            this.addTarget_action_forControlEvents(
                Some(target),
                sel!(editingChanged:),
                UIControlEvents::EditingChanged,
            );
        }
        this.setDelegate(Some(ProtocolObject::from_ref(&*this)));

        this
    }

    /// Offset of `position` from the start of the field, in UTF-16 code units.
    fn offset_of(&self, position: &UITextPosition) -> usize {
        let start = self.beginningOfDocument();
        self.offsetFromPosition_toPosition(&start, position).max(0) as usize
    }
}

/// [`BackwardFieldHost`] backed by an invisible text field inside the game view.
pub struct UIKitBackwardField {
    game_view: Retained<UIView>,
    field: Retained<BackwardTextField>,
    observers: RefCell<Vec<Observer>>,
}

impl UIKitBackwardField {
    fn new(
        game_view: &UIView,
        handler: Weak<BackwardFieldImeHandler<UIKitBackwardField>>,
    ) -> Self {
        let mtm = MainThreadMarker::from(game_view);
        let field = BackwardTextField::new(mtm, handler.clone());
        game_view.addSubview(&field);

        let observers = vec![
            Observer::new(unsafe { UIKeyboardWillShowNotification }, {
                let handler = handler.clone();
                move |notification| {
                    if let (Some(handler), Some(height)) =
                        (handler.upgrade(), keyboard_end_height(notification))
                    {
                        handler.keyboard_will_show(height);
                    }
                }
            }),
            Observer::new(unsafe { UIKeyboardWillHideNotification }, move |_| {
                if let Some(handler) = handler.upgrade() {
                    handler.keyboard_will_hide();
                }
            }),
        ];

        Self { game_view: game_view.retain(), field, observers: RefCell::new(observers) }
    }
}

impl ScreenMetrics for UIKitBackwardField {
    fn screen_scale(&self) -> f64 {
        super::screen_scale(&self.game_view)
    }

    fn window_height(&self) -> f64 {
        super::window_height(&self.game_view)
    }
}

impl BackwardFieldHost for UIKitBackwardField {
    fn field_snapshot(&self) -> FieldSnapshot {
        let text = self.field.text().map(|text| text.to_string()).unwrap_or_default();
        let marked = self.field.markedTextRange().map(|range| {
            let start = self.field.offset_of(&range.start());
            let end = self.field.offset_of(&range.end());
            let selection = match self.field.selectedTextRange() {
                Some(selected) => self.field.offset_of(&selected.start()),
                None => end,
            };
            MarkedText { range: start..end, selection }
        });
        FieldSnapshot { text, marked }
    }

    fn clear_field(&self) {
        self.field.setText(Some(&NSString::from_str("")));
    }

    fn focus_field(&self) -> Result<(), ImeError> {
        if !self.field.becomeFirstResponder() {
            return Err(os_error!("the text field refused to become first responder").into());
        }
        Ok(())
    }

    fn resign_field(&self) {
        self.field.resignFirstResponder();
    }

    fn focus_game_view(&self) {
        self.game_view.becomeFirstResponder();
    }

    fn release(&self) {
        self.observers.borrow_mut().clear();
        self.field.setDelegate(None);
        let target: &AnyObject = &self.field;
        unsafe {
            self.field.removeTarget_action_forControlEvents(
                Some(target),
                None,
                UIControlEvents::AllEvents,
            );
        }
        self.field.removeFromSuperview();
        debug!("backward field removed");
    }
}

impl Drop for UIKitBackwardField {
    fn drop(&mut self) {
        self.field.removeFromSuperview();
    }
}

/// Create the adapter and add its field to `game_view`.
///
/// The field and keyboard observers hold the adapter weakly; dropping the returned `Rc` or
/// calling `detach` releases them.
pub fn new_backward_field_handler(
    game_view: &UIView,
    attributes: ImeAttributes,
) -> Rc<BackwardFieldImeHandler<UIKitBackwardField>> {
    Rc::new_cyclic(|handler| {
        let host = UIKitBackwardField::new(game_view, handler.clone());
        BackwardFieldImeHandler::new(host, attributes)
    })
}
