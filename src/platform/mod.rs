//! Platform specific IME adapters.
//!
//! Contains the following OS-specific modules:
//!
//!  - `android`
//!  - `ios`
//!  - `windows`
//!
//! The adapters themselves do not depend on the platform SDK and are available everywhere, driven
//! through a host trait that abstracts the native widgets. The bindings of those host traits to
//! the actual toolkit are only available when compiling for the corresponding platform.

pub mod android;
pub mod ios;
pub mod windows;
