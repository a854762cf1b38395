//! Virtual-key codes to [`KeyCode`]s.
//!
//! Only keys that can produce a character are covered, since the mapping is used to attach a key
//! to text input.

use ime_bridge_core::keyboard::KeyCode;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    VIRTUAL_KEY, VK_0, VK_9, VK_A, VK_ADD, VK_BACK, VK_DECIMAL, VK_DIVIDE, VK_ESCAPE,
    VK_MULTIPLY, VK_NUMPAD0, VK_NUMPAD9, VK_OEM_1, VK_OEM_102, VK_OEM_2, VK_OEM_3, VK_OEM_4,
    VK_OEM_5, VK_OEM_6, VK_OEM_7, VK_OEM_COMMA, VK_OEM_MINUS, VK_OEM_PERIOD, VK_OEM_PLUS,
    VK_RETURN, VK_SPACE, VK_SUBTRACT, VK_TAB, VK_Z,
};

const LETTERS: [KeyCode; 26] = [
    KeyCode::KeyA,
    KeyCode::KeyB,
    KeyCode::KeyC,
    KeyCode::KeyD,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyH,
    KeyCode::KeyI,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::KeyM,
    KeyCode::KeyN,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::KeyQ,
    KeyCode::KeyR,
    KeyCode::KeyS,
    KeyCode::KeyT,
    KeyCode::KeyU,
    KeyCode::KeyV,
    KeyCode::KeyW,
    KeyCode::KeyX,
    KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

const NUMPAD_DIGITS: [KeyCode; 10] = [
    KeyCode::Numpad0,
    KeyCode::Numpad1,
    KeyCode::Numpad2,
    KeyCode::Numpad3,
    KeyCode::Numpad4,
    KeyCode::Numpad5,
    KeyCode::Numpad6,
    KeyCode::Numpad7,
    KeyCode::Numpad8,
    KeyCode::Numpad9,
];

/// Map the low byte of a `VkKeyScanEx` result to a key.
pub fn vkey_to_key_code(vkey: VIRTUAL_KEY) -> Option<KeyCode> {
    let key = match vkey {
        VK_A..=VK_Z => LETTERS[usize::from(vkey - VK_A)],
        VK_0..=VK_9 => DIGITS[usize::from(vkey - VK_0)],
        VK_NUMPAD0..=VK_NUMPAD9 => NUMPAD_DIGITS[usize::from(vkey - VK_NUMPAD0)],
        VK_BACK => KeyCode::Backspace,
        VK_TAB => KeyCode::Tab,
        VK_RETURN => KeyCode::Enter,
        VK_ESCAPE => KeyCode::Escape,
        VK_SPACE => KeyCode::Space,
        VK_MULTIPLY => KeyCode::NumpadMultiply,
        VK_ADD => KeyCode::NumpadAdd,
        VK_SUBTRACT => KeyCode::NumpadSubtract,
        VK_DECIMAL => KeyCode::NumpadDecimal,
        VK_DIVIDE => KeyCode::NumpadDivide,
        VK_OEM_1 => KeyCode::Semicolon,
        VK_OEM_PLUS => KeyCode::Equal,
        VK_OEM_COMMA => KeyCode::Comma,
        VK_OEM_MINUS => KeyCode::Minus,
        VK_OEM_PERIOD => KeyCode::Period,
        VK_OEM_2 => KeyCode::Slash,
        VK_OEM_3 => KeyCode::Backquote,
        VK_OEM_4 => KeyCode::BracketLeft,
        VK_OEM_5 => KeyCode::Backslash,
        VK_OEM_6 => KeyCode::BracketRight,
        VK_OEM_7 => KeyCode::Quote,
        VK_OEM_102 => KeyCode::IntlBackslash,
        _ => return None,
    };
    Some(key)
}
