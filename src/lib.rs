//! Calm Browsing Buddy: ad, popup and redirect blocking for a browser host.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod dom;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
