use serde::{Deserialize, Serialize};

use super::settings::SettingsPatch;

/// An outgoing request observed before it is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub url: String,
    #[serde(default)]
    pub tab_id: Option<i64>,
    /// Resource type as reported by the browser (`script`, `image`, ...).
    #[serde(default)]
    pub resource_type: Option<String>,
    /// URL of the document that issued the request.
    #[serde(default)]
    pub initiator: Option<String>,
}

/// A navigation about to start in some frame of a tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDetails {
    pub tab_id: i64,
    /// `0` for the top-level frame.
    pub frame_id: i64,
    /// Navigation target.
    pub url: String,
    /// What the tab currently shows, if the host knows.
    #[serde(default)]
    pub current_url: Option<String>,
}

/// A newly created tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: i64,
    #[serde(default)]
    pub opener_tab_id: Option<i64>,
    pub active: bool,
    #[serde(default)]
    pub url: Option<String>,
}

/// Browser-process events handled by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    Request(RequestDetails),
    Navigation(NavigationDetails),
    TabCreated(TabInfo),
}

/// Side effects the host must carry out after an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    CancelRequest,
    #[serde(rename_all = "camelCase")]
    RedirectTab { tab_id: i64, url: String },
    #[serde(rename_all = "camelCase")]
    CloseTab { tab_id: i64 },
    Notify { title: String, message: String },
    SetBadge { text: String, color: String },
}

fn one() -> u64 {
    1
}

/// Action-tagged messages exchanged between the page scanner, the UIs and
/// the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    GetStats,
    GetSettings,
    UpdateSettings {
        settings: SettingsPatch,
    },
    AddToWhitelist {
        domain: String,
    },
    RemoveFromWhitelist {
        domain: String,
    },
    GetWhitelist,
    AdRemoved {
        #[serde(default = "one")]
        count: u64,
    },
    PopupBlocked {
        #[serde(default)]
        url: Option<String>,
    },
    SuspiciousRedirect {
        #[serde(rename = "type")]
        kind: String,
        content: String,
    },
}
