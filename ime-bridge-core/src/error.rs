//! Common error types.

use std::{error, fmt};

/// Create an [`OsError`] tagged with the current source location.
#[macro_export]
macro_rules! os_error {
    ($error:expr) => {{
        $crate::error::OsError::new(line!(), file!(), $error)
    }};
}

/// An error that may be generated by an IME adapter.
#[derive(Debug)]
#[non_exhaustive]
pub enum ImeError {
    /// The operation is not supported by the backend.
    NotSupported(NotSupportedError),
    /// The adapter was detached from its native widgets and can no longer be used.
    Detached,
    /// The OS cannot perform the operation.
    Os(OsError),
}

impl From<NotSupportedError> for ImeError {
    fn from(value: NotSupportedError) -> Self {
        Self::NotSupported(value)
    }
}

impl From<OsError> for ImeError {
    fn from(value: OsError) -> Self {
        Self::Os(value)
    }
}

impl fmt::Display for ImeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ImeError::NotSupported(e) => e.fmt(f),
            ImeError::Detached => write!(f, "the ime adapter has been detached"),
            ImeError::Os(e) => e.fmt(f),
        }
    }
}

impl error::Error for ImeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ImeError::Os(e) => Some(e),
            _ => None,
        }
    }
}

/// The error type for when the requested operation is not supported by the backend.
#[derive(Clone)]
pub struct NotSupportedError {
    _marker: (),
}

impl Default for NotSupportedError {
    fn default() -> Self {
        Self::new()
    }
}

impl NotSupportedError {
    /// Create a new [`NotSupportedError`].
    #[inline]
    pub fn new() -> NotSupportedError {
        NotSupportedError { _marker: () }
    }
}

impl fmt::Debug for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("NotSupportedError").finish()
    }
}

impl fmt::Display for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.pad("the requested operation is not supported by this ime backend")
    }
}

impl error::Error for NotSupportedError {}

/// The error type for when the OS cannot perform the requested operation.
#[derive(Debug)]
pub struct OsError {
    line: u32,
    file: &'static str,
    error: Box<dyn error::Error + 'static>,
}

impl OsError {
    #[doc(hidden)]
    pub fn new(line: u32, file: &'static str, error: impl Into<Box<dyn error::Error>>) -> Self {
        Self { line, file, error: error.into() }
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.pad(&format!("os error at {}:{}: {}", self.file, self.line, self.error))
    }
}

impl error::Error for OsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::redundant_clone)]

    use super::*;

    // Eat attributes for testing
    #[test]
    fn ensure_fmt_does_not_panic() {
        let _ = format!(
            "{:?}, {}, {}",
            ImeError::NotSupported(NotSupportedError::new().clone()),
            ImeError::Detached,
            ImeError::from(os_error!("window handle is gone")),
        );
    }

    #[test]
    fn os_error_reports_location() {
        let err = os_error!("no input context");
        let text = err.to_string();
        assert!(text.starts_with("os error at "));
        assert!(text.contains("error.rs"));
        assert!(text.ends_with("no input context"));
    }
}
