//! Base types for the IME bridges.
//!
//! This crate contains the platform independent part of [`ime-bridge`]: the
//! [`TextInputHandler`](handler::TextInputHandler) contract every backend implements, the
//! notification types it raises, and the small amount of state bookkeeping the backends share.
//! Backends depend on this crate only, so they can be built and tested on any host.
//!
//! [`ime-bridge`]: https://docs.rs/ime-bridge

pub mod attributes;
pub mod error;
pub mod geometry;
pub mod handler;
pub mod ime;
pub mod keyboard;
pub mod listeners;
pub mod session;
pub mod touch;
