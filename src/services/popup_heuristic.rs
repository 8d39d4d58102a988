//! Popup Heuristic for Calm Browsing Buddy.
//!
//! Two independent checks: the coordinator flags new background tabs that
//! have an opener, and the page side guards `window.open` calls made without
//! focus or in rapid succession.

use tracing::debug;

use crate::types::events::{Message, TabInfo};
use crate::types::settings::Settings;

/// Notification shown after a popup tab is closed.
pub const POPUP_NOTIFICATION_TITLE: &str = "Popup Blocked";
pub const POPUP_NOTIFICATION_MESSAGE: &str =
    "A popup was blocked. Click the extension icon to allow it.";

/// More than this many `window.open` calls between clicks are blocked.
const MAX_OPENS_PER_CLICK: u32 = 2;

/// A new tab with an opener that did not become active is treated as a popup.
pub fn is_popup_tab(tab: &TabInfo, settings: &Settings) -> bool {
    settings.popup_blocking && tab.opener_tab_id.is_some() && !tab.active
}

/// Verdict for a `window.open` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenVerdict {
    Allow,
    Block { url: Option<String> },
}

impl OpenVerdict {
    /// The `popupBlocked` report for a blocked call.
    pub fn report(&self) -> Option<Message> {
        match self {
            OpenVerdict::Allow => None,
            OpenVerdict::Block { url } => Some(Message::PopupBlocked { url: url.clone() }),
        }
    }
}

/// Per-page `window.open` guard.
#[derive(Debug, Default, Clone)]
pub struct PopupGuard {
    attempts: u32,
}

impl PopupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an open attempt. Blocked when the document has no focus or
    /// when more than two opens happened since the last user click.
    pub fn on_window_open(&mut self, url: Option<&str>, document_has_focus: bool) -> OpenVerdict {
        self.attempts = self.attempts.saturating_add(1);
        if !document_has_focus || self.attempts > MAX_OPENS_PER_CLICK {
            debug!(attempts = self.attempts, focus = document_has_focus, "window.open blocked");
            return OpenVerdict::Block {
                url: url.map(str::to_string),
            };
        }
        OpenVerdict::Allow
    }

    /// A user click resets the attempt counter.
    pub fn on_user_click(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
