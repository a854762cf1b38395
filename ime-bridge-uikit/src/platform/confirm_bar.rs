use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::ImeError;
use ime_bridge_core::os_error;
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2::{
    define_class, msg_send, sel, DefinedClass, MainThreadMarker, MainThreadOnly, Message,
};
use objc2_core_foundation::{CGFloat, CGPoint, CGRect, CGSize};
use objc2_foundation::{NSObject, NSObjectProtocol, NSString};
use objc2_ui_kit::{
    UIButton, UIButtonType, UIColor, UIControlEvents, UIControlState, UIKeyboardType,
    UIKeyboardWillHideNotification, UIKeyboardWillShowNotification, UIReturnKeyType,
    UITextAutocapitalizationType, UITextField, UITextFieldDelegate,
    UITextInputTraits, UIView, UIViewAutoresizing,
};
use tracing::debug;

use super::notification::{keyboard_end_height, Observer};
use crate::confirm_bar::{ConfirmBarHost, ConfirmBarImeHandler};
use crate::screen::ScreenMetrics;

/// Width of the confirm button in points.
const CONFIRM_BUTTON_WIDTH: CGFloat = 80.0;

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "ImeBridgeConfirmBarTarget"]
    #[ivars = Weak<ConfirmBarImeHandler<UIKitConfirmBar>>]
    struct ConfirmBarTarget;

    impl ConfirmBarTarget {
        #[unsafe(method(editingChanged:))]
        fn editing_changed(&self, _sender: &UITextField) {
            if let Some(handler) = self.ivars().upgrade() {
                handler.on_editing_changed();
            }
        }

        #[unsafe(method(confirmPressed:))]
        fn confirm_pressed(&self, _sender: &UIButton) {
            if let Some(handler) = self.ivars().upgrade() {
                handler.on_confirm_pressed();
            }
        }
    }

    unsafe impl NSObjectProtocol for ConfirmBarTarget {}

    unsafe impl UITextFieldDelegate for ConfirmBarTarget {
        #[unsafe(method(textFieldShouldReturn:))]
        fn text_field_should_return(&self, _text_field: &UITextField) -> bool {
            self.ivars().upgrade().map_or(false, |handler| handler.should_return())
        }
    }
);

impl ConfirmBarTarget {
    fn new(
        mtm: MainThreadMarker,
        handler: Weak<ConfirmBarImeHandler<UIKitConfirmBar>>,
    ) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(handler);
        unsafe { msg_send![super(this), init] }
    }
}

/// [`ConfirmBarHost`] made of UIKit views, added on top of the game view.
pub struct UIKitConfirmBar {
    game_view: Retained<UIView>,
    panel: Retained<UIView>,
    field: Retained<UITextField>,
    button: Retained<UIButton>,
    target: Retained<ConfirmBarTarget>,
    observers: RefCell<Vec<Observer>>,
}

impl UIKitConfirmBar {
    fn new(
        game_view: &UIView,
        handler: Weak<ConfirmBarImeHandler<UIKitConfirmBar>>,
        panel_height: u32,
    ) -> Self {
        let mtm = MainThreadMarker::from(game_view);
        let bounds = game_view.bounds();
        let width = bounds.size.width;
        let height = panel_height as CGFloat;

        let panel = UIView::initWithFrame(
            mtm.alloc(),
            CGRect::new(
                CGPoint::new(0.0, bounds.size.height - height),
                CGSize::new(width, height),
            ),
        );
        panel.setBackgroundColor(Some(&UIColor::whiteColor()));
        panel.setAutoresizingMask(UIViewAutoresizing::FlexibleWidth);

        let field = UITextField::initWithFrame(
            mtm.alloc(),
            CGRect::new(
                CGPoint::new(0.0, 0.0),
                CGSize::new(width - CONFIRM_BUTTON_WIDTH, height),
            ),
        );
        field.setAutoresizingMask(UIViewAutoresizing::FlexibleWidth);
        unsafe {
            field.setKeyboardType(UIKeyboardType::Default);
            field.setReturnKeyType(UIReturnKeyType::Done);
            field.setAutocapitalizationType(UITextAutocapitalizationType::None);
        }

        let button = UIButton::buttonWithType(UIButtonType::System, mtm);
        button.setFrame(CGRect::new(
            CGPoint::new(width - CONFIRM_BUTTON_WIDTH, 0.0),
            CGSize::new(CONFIRM_BUTTON_WIDTH, height),
        ));
        button.setAutoresizingMask(UIViewAutoresizing::FlexibleLeftMargin);
        button.setTitleColor_forState(Some(&UIColor::blackColor()), UIControlState::Normal);
        button.setBackgroundColor(Some(&UIColor::lightGrayColor()));

        let target = ConfirmBarTarget::new(mtm, handler.clone());
        let action_target: &AnyObject = &target;
        unsafe {
            field.addTarget_action_forControlEvents(
                Some(action_target),
                sel!(editingChanged:),
                UIControlEvents::EditingChanged,
            );
            button.addTarget_action_forControlEvents(
                Some(action_target),
                sel!(confirmPressed:),
                UIControlEvents::TouchUpInside,
            );
        }
        field.setDelegate(Some(ProtocolObject::from_ref(&*target)));

        panel.addSubview(&field);
        panel.addSubview(&button);
        game_view.addSubview(&panel);

        let observers = vec![
            Observer::new(unsafe { UIKeyboardWillShowNotification }, {
                let handler = handler.clone();
                move |notification| {
                    let Some(height) = keyboard_end_height(notification) else {
                        return;
                    };
                    if let Some(handler) = handler.upgrade() {
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

        Self {
            game_view: game_view.retain(),
            panel,
            field,
            button,
            target,
            observers: RefCell::new(observers),
        }
    }
}

impl ScreenMetrics for UIKitConfirmBar {
    fn screen_scale(&self) -> f64 {
        super::screen_scale(&self.game_view)
    }

    fn window_height(&self) -> f64 {
        super::window_height(&self.game_view)
    }
}

impl ConfirmBarHost for UIKitConfirmBar {
    fn set_panel_hidden(&self, hidden: bool) {
        self.panel.setHidden(hidden);
    }

    fn set_panel_origin_y(&self, y: f64) {
        let mut frame = self.panel.frame();
        frame.origin.y = y as CGFloat;
        frame.size.width = self.game_view.bounds().size.width;
        self.panel.setFrame(frame);
    }

    fn set_confirm_title(&self, title: &str) {
        self.button.setTitle_forState(Some(&NSString::from_str(title)), UIControlState::Normal);
    }

    fn set_field_text(&self, text: &str) {
        self.field.setText(Some(&NSString::from_str(text)));
    }

    fn field_text(&self) -> String {
        self.field.text().map(|text| text.to_string()).unwrap_or_default()
    }

    fn select_all_field_text(&self) {
        let _: () = unsafe { msg_send![&*self.field, selectAll: None::<&AnyObject>] };
    }

    fn focus_field(&self) -> Result<(), ImeError> {
        if !self.field.becomeFirstResponder() {
            return Err(os_error!("the text field refused to become first responder").into());
        }
        Ok(())
    }

    fn end_editing(&self) {
        self.field.endEditing(true);
    }

    fn focus_game_view(&self) {
        self.field.resignFirstResponder();
        self.game_view.becomeFirstResponder();
    }

    fn bounds_height(&self) -> f64 {
        self.game_view.bounds().size.height as f64
    }

    fn release(&self) {
        self.observers.borrow_mut().clear();
        self.field.setDelegate(None);
        let action_target: &AnyObject = &self.target;
        unsafe {
            self.field.removeTarget_action_forControlEvents(
                Some(action_target),
                None,
                UIControlEvents::AllEvents,
            );
            self.button.removeTarget_action_forControlEvents(
                Some(action_target),
                None,
                UIControlEvents::AllEvents,
            );
        }
        self.panel.removeFromSuperview();
        debug!("confirm bar views removed");
    }
}

/// Create the adapter and add its views on top of `game_view`.
///
/// The views and keyboard observers hold the adapter weakly; dropping the returned `Rc` or
/// calling `detach` releases them.
pub fn new_confirm_bar_handler(
    game_view: &UIView,
    attributes: ImeAttributes,
) -> Rc<ConfirmBarImeHandler<UIKitConfirmBar>> {
    Rc::new_cyclic(|handler| {
        let host = UIKitConfirmBar::new(game_view, handler.clone(), attributes.input_panel_height);
        ConfirmBarImeHandler::new(host, attributes)
    })
}

impl Drop for UIKitConfirmBar {
    fn drop(&mut self) {
        self.panel.removeFromSuperview();
    }
}
