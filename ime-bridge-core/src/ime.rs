//! Text carried by IME notifications.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::keyboard::KeyCode;

/// An immutable string produced by a native text input service.
///
/// Native services hand out text in their own encoding, UTF-16 for every backend currently
/// supported. `ImeString` decouples engine code from that encoding: it can be built from either
/// UTF-8 or UTF-16 and is cheap to clone.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImeString(SmolStr);

impl ImeString {
    /// The empty string.
    pub const fn new() -> Self {
        Self(SmolStr::new_inline(""))
    }

    /// Decode a native UTF-16 buffer, replacing invalid sequences with U+FFFD.
    ///
    /// Trailing NUL terminators, as returned by most C APIs, are dropped. NULs inside the text
    /// are kept.
    pub fn from_utf16_lossy(units: &[u16]) -> Self {
        let end = units.iter().rposition(|&unit| unit != 0).map_or(0, |last| last + 1);
        let units = &units[..end];
        Self(char::decode_utf16(units.iter().copied()).map(|c| c.unwrap_or('\u{FFFD}')).collect())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of Unicode scalar values.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Length in UTF-16 code units, the unit native cursors are usually expressed in.
    pub fn len_utf16(&self) -> usize {
        self.0.chars().map(char::len_utf16).sum()
    }

    pub fn encode_utf16(&self) -> Vec<u16> {
        self.0.encode_utf16().collect()
    }

    /// Convert an offset in UTF-16 code units into an offset in chars.
    ///
    /// Offsets past the end, or in the middle of a surrogate pair, are clamped.
    pub fn utf16_to_char_offset(&self, utf16_offset: usize) -> usize {
        let mut units = 0;
        for (index, c) in self.0.chars().enumerate() {
            units += c.len_utf16();
            if units > utf16_offset {
                return index;
            }
        }
        self.char_count()
    }
}

impl From<&str> for ImeString {
    fn from(value: &str) -> Self {
        Self(SmolStr::new(value))
    }
}

impl From<String> for ImeString {
    fn from(value: String) -> Self {
        Self(SmolStr::from(value))
    }
}

impl From<SmolStr> for ImeString {
    fn from(value: SmolStr) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ImeString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ImeString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ImeString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for ImeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ImeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single character accepted by the input service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextInputEvent {
    /// The character that was typed.
    pub character: char,
    /// Best-effort mapping of the character to a physical key, `None` when there is no key on the
    /// current layout producing it.
    pub key: Option<KeyCode>,
}

impl TextInputEvent {
    pub fn new(character: char, key: Option<KeyCode>) -> Self {
        Self { character, key }
    }
}

/// A page of conversion candidates offered by the IME.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateList {
    /// Every candidate known to the IME, not only the visible page.
    pub candidates: Vec<ImeString>,
    /// Index of the first candidate on the current page.
    pub page_start: usize,
    /// Number of candidates per page.
    pub page_size: usize,
    /// Index of the highlighted candidate.
    pub selection: usize,
}

impl CandidateList {
    /// The candidates on the current page.
    pub fn page(&self) -> &[ImeString] {
        let start = self.page_start.min(self.candidates.len());
        let end = start.saturating_add(self.page_size).min(self.candidates.len());
        &self.candidates[start..end]
    }

    /// The highlighted candidate, if the selection is in range.
    pub fn selected(&self) -> Option<&ImeString> {
        self.candidates.get(self.selection)
    }
}

/// The uncommitted text being composed by the IME.
///
/// An empty `text` means the composition ended or was cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextCompositionEvent {
    pub text: ImeString,
    /// Caret offset inside `text`, in chars.
    pub cursor: usize,
    /// Conversion candidates, on backends that expose them.
    pub candidates: Option<CandidateList>,
}

impl TextCompositionEvent {
    pub fn new(text: impl Into<ImeString>, cursor: usize) -> Self {
        Self { text: text.into(), cursor, candidates: None }
    }

    pub fn with_candidates(self, candidates: CandidateList) -> Self {
        Self { candidates: Some(candidates), ..self }
    }

    /// The event sent when a composition ends.
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// The content of an on-screen confirm bar text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultTextEvent {
    pub text: ImeString,
    /// `true` for the single event sent when the session stops; the field is cleared right after.
    pub is_final: bool,
}

impl ResultTextEvent {
    pub fn new(text: impl Into<ImeString>, is_final: bool) -> Self {
        Self { text: text.into(), is_final }
    }
}
