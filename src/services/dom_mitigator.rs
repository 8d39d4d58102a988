//! DOM Mitigator for Calm Browsing Buddy.
//!
//! Hides a recognized ad without detaching it, so layout scripts holding a
//! reference to the element keep working.

use tracing::trace;

use crate::dom::Page;
use crate::types::catalog::BLOCKED_MARKER_CLASS;

/// Inline declarations written by [`mitigate`].
const HIDING_STYLES: &[(&str, &str)] = &[
    ("display", "none !important"),
    ("visibility", "hidden !important"),
    ("opacity", "0 !important"),
    ("height", "0px !important"),
    ("width", "0px !important"),
];

/// Hides `node` and marks it as handled.
///
/// Returns `true` only when the element was not already marked, so repeated
/// calls leave the same end state and are counted once.
pub fn mitigate<P: Page>(page: &mut P, node: P::Node) -> bool {
    if page.has_class(node, BLOCKED_MARKER_CLASS) {
        return false;
    }
    for (property, value) in HIDING_STYLES {
        page.set_style(node, property, value);
    }
    page.set_attribute(node, "aria-hidden", "true");
    page.set_hidden(node, true);
    page.add_class(node, BLOCKED_MARKER_CLASS);
    trace!(?node, "element hidden");
    true
}

/// Counts first-time mitigations during one scan pass.
///
/// The tally is never persisted by itself; the scan owner reports it once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MitigationTally {
    removed: u64,
}

impl MitigationTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mitigates `node` and counts it if it was not handled before.
    pub fn mitigate<P: Page>(&mut self, page: &mut P, node: P::Node) -> bool {
        let first_time = mitigate(page, node);
        if first_time {
            self.removed += 1;
        }
        first_time
    }

    pub fn removed(&self) -> u64 {
        self.removed
    }
}
