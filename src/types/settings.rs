use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Blocking toggles controlled from the popup and options views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub ad_blocking: bool,
    #[serde(default = "default_true")]
    pub popup_blocking: bool,
    #[serde(default = "default_true")]
    pub redirect_blocking: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ad_blocking: true,
            popup_blocking: true,
            redirect_blocking: true,
        }
    }
}

impl Settings {
    /// Merge a partial update; absent fields keep their current value.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.ad_blocking {
            self.ad_blocking = v;
        }
        if let Some(v) = patch.popup_blocking {
            self.popup_blocking = v;
        }
        if let Some(v) = patch.redirect_blocking {
            self.redirect_blocking = v;
        }
    }
}

/// Partial settings update as sent by `updateSettings`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_blocking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_blocking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_blocking: Option<bool>,
}

/// Cumulative blocking counters.
///
/// Counters only ever grow. There is no decrement or reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub ads_blocked: u64,
    #[serde(default)]
    pub popups_blocked: u64,
    #[serde(default)]
    pub redirects_blocked: u64,
}

impl Stats {
    pub fn record_ads(&mut self, count: u64) {
        self.ads_blocked = self.ads_blocked.saturating_add(count);
    }

    pub fn record_popup(&mut self) {
        self.popups_blocked = self.popups_blocked.saturating_add(1);
    }

    pub fn record_redirect(&mut self) {
        self.redirects_blocked = self.redirects_blocked.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.ads_blocked
            .saturating_add(self.popups_blocked)
            .saturating_add(self.redirects_blocked)
    }
}

/// Everything persisted under the `settings`, `whitelist` and `stats` keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoredState {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub whitelist: BTreeSet<String>,
    #[serde(default)]
    pub stats: Stats,
}

impl StoredState {
    /// Last-write-wins merge of a partial write.
    pub fn merge(&mut self, patch: StatePatch) {
        if let Some(settings) = patch.settings {
            self.settings = settings;
        }
        if let Some(whitelist) = patch.whitelist {
            self.whitelist = whitelist;
        }
        if let Some(stats) = patch.stats {
            self.stats = stats;
        }
    }
}

/// A partial write against the store; `None` keys are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl StatePatch {
    /// A patch carrying every key, as written after each coordinator change.
    pub fn full(state: &StoredState) -> Self {
        Self {
            settings: Some(state.settings),
            whitelist: Some(state.whitelist.clone()),
            stats: Some(state.stats),
        }
    }
}
