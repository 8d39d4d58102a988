use serde::{Deserialize, Serialize};

/// Rendered size of an element in CSS pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Playback state of a media element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MediaState {
    pub duration: f64,
    pub current_time: f64,
    pub paused: bool,
}

/// Per-element verdict of one scan pass. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationResult {
    Ad,
    ProtectedPlayer,
    OrdinaryContent,
}

/// Summary of the DOM changes observed since the last notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MutationRecord {
    pub added_nodes: usize,
}

/// Outcome of a single scan pass over a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanReport {
    /// Elements hidden for the first time during this pass.
    pub removed: u64,
    /// Selectors skipped because the page could not evaluate them.
    pub skipped_selectors: usize,
    /// Classification units that failed and were skipped.
    pub failed_elements: usize,
    pub skip_ad_clicked: bool,
    pub ad_fast_forwarded: bool,
    /// `content` of a removed `<meta http-equiv="refresh">` redirect.
    pub meta_refresh: Option<String>,
}
