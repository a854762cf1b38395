//! Types related to the keyboard.

pub use keyboard_types::Code as KeyCode;

/// The character delivered with a synthesized backspace.
pub const BACKSPACE: char = '\u{8}';

/// Map a character to the key producing it on a US layout.
///
/// Used by backends whose native API only reports text. Shifted symbols map to their base key,
/// characters without a dedicated key map to `None`.
pub fn key_for_char(c: char) -> Option<KeyCode> {
    let key = match c.to_ascii_lowercase() {
        'a' => KeyCode::KeyA,
        'b' => KeyCode::KeyB,
        'c' => KeyCode::KeyC,
        'd' => KeyCode::KeyD,
        'e' => KeyCode::KeyE,
        'f' => KeyCode::KeyF,
        'g' => KeyCode::KeyG,
        'h' => KeyCode::KeyH,
        'i' => KeyCode::KeyI,
        'j' => KeyCode::KeyJ,
        'k' => KeyCode::KeyK,
        'l' => KeyCode::KeyL,
        'm' => KeyCode::KeyM,
        'n' => KeyCode::KeyN,
        'o' => KeyCode::KeyO,
        'p' => KeyCode::KeyP,
        'q' => KeyCode::KeyQ,
        'r' => KeyCode::KeyR,
        's' => KeyCode::KeyS,
        't' => KeyCode::KeyT,
        'u' => KeyCode::KeyU,
        'v' => KeyCode::KeyV,
        'w' => KeyCode::KeyW,
        'x' => KeyCode::KeyX,
        'y' => KeyCode::KeyY,
        'z' => KeyCode::KeyZ,

        '0' | ')' => KeyCode::Digit0,
        '1' | '!' => KeyCode::Digit1,
        '2' | '@' => KeyCode::Digit2,
        '3' | '#' => KeyCode::Digit3,
        '4' | '$' => KeyCode::Digit4,
        '5' | '%' => KeyCode::Digit5,
        '6' | '^' => KeyCode::Digit6,
        '7' | '&' => KeyCode::Digit7,
        '8' | '*' => KeyCode::Digit8,
        '9' | '(' => KeyCode::Digit9,

        ' ' => KeyCode::Space,
        '\n' | '\r' => KeyCode::Enter,
        '\t' => KeyCode::Tab,
        BACKSPACE => KeyCode::Backspace,
        '\u{1b}' => KeyCode::Escape,
        '-' | '_' => KeyCode::Minus,
        '=' | '+' => KeyCode::Equal,
        '[' | '{' => KeyCode::BracketLeft,
        ']' | '}' => KeyCode::BracketRight,
        '\\' | '|' => KeyCode::Backslash,
        ';' | ':' => KeyCode::Semicolon,
        '\'' | '"' => KeyCode::Quote,
        ',' | '<' => KeyCode::Comma,
        '.' | '>' => KeyCode::Period,
        '/' | '?' => KeyCode::Slash,
        '`' | '~' => KeyCode::Backquote,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_ignore_case() {
        assert_eq!(key_for_char('h'), Some(KeyCode::KeyH));
        assert_eq!(key_for_char('H'), Some(KeyCode::KeyH));
    }

    #[test]
    fn shifted_symbols_map_to_base_key() {
        assert_eq!(key_for_char('!'), Some(KeyCode::Digit1));
        assert_eq!(key_for_char('?'), Some(KeyCode::Slash));
        assert_eq!(key_for_char(BACKSPACE), Some(KeyCode::Backspace));
    }

    #[test]
    fn non_ascii_has_no_key() {
        assert_eq!(key_for_char('é'), None);
        assert_eq!(key_for_char('你'), None);
    }
}
