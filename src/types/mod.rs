// Calm Browsing Buddy shared type definitions
// Each submodule defines types used by both the page scanner and the coordinator.

pub mod catalog;
pub mod dom;
pub mod errors;
pub mod events;
pub mod settings;
