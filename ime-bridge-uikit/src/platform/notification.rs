use std::ptr::NonNull;

use block2::RcBlock;
use objc2::msg_send;
use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_core_foundation::CGRect;
use objc2_foundation::{NSNotification, NSNotificationCenter, NSNotificationName};
use objc2_ui_kit::UIKeyboardFrameEndUserInfoKey;

/// An observer registered with the default notification center, removed on drop.
///
/// The handler runs on the posting thread.
pub(crate) struct Observer {
    center: Retained<NSNotificationCenter>,
    token: Retained<AnyObject>,
}

impl Observer {
    pub fn new(name: &NSNotificationName, handler: impl Fn(&NSNotification) + 'static) -> Self {
        let center = NSNotificationCenter::defaultCenter();
        let block = RcBlock::new(move |notification: NonNull<NSNotification>| {
            handler(unsafe { notification.as_ref() });
        });
        let token = unsafe {
            center.addObserverForName_object_queue_usingBlock(Some(name), None, None, &block)
        };
        // The token is an opaque `NSObject`.
        let token = unsafe { Retained::cast_unchecked::<AnyObject>(token) };
        Self { center, token }
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        unsafe { self.center.removeObserver(&self.token) };
    }
}

/// Height in points of the keyboard's end frame carried by a keyboard notification.
pub(crate) fn keyboard_end_height(notification: &NSNotification) -> Option<f64> {
    let user_info = notification.userInfo()?;
    let value = user_info.objectForKey(unsafe { UIKeyboardFrameEndUserInfoKey })?;
    let frame: CGRect = unsafe { msg_send![&*value, CGRectValue] };
    Some(frame.size.height as f64)
}
