//! App Core for Calm Browsing Buddy.
//!
//! The background coordinator: owns settings, whitelist and stats, turns
//! browser events into effects for the host, and answers action messages
//! from the page scanner and the popup/options views.

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::services::network_gatekeeper::{
    NavigationVerdict, NetworkGatekeeper, NetworkGatekeeperTrait, RequestVerdict,
};
use crate::services::popup_heuristic::{
    is_popup_tab, POPUP_NOTIFICATION_MESSAGE, POPUP_NOTIFICATION_TITLE,
};
use crate::services::settings_store::SettingsStore;
use crate::types::catalog::FilterCatalog;
use crate::types::errors::AppError;
use crate::types::events::{
    BrowserEvent, Effect, Message, NavigationDetails, RequestDetails, TabInfo,
};
use crate::types::settings::{Settings, StatePatch, Stats, StoredState};

pub const BADGE_COLOR: &str = "#3b82f6";
const DOMAIN_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_.\-]*[a-zA-Z0-9]$";

/// Reply to an action message plus the effects it caused.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub response: Value,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn reply(response: Value) -> Self {
        Self {
            response,
            effects: Vec::new(),
        }
    }

    fn success(effects: Vec<Effect>) -> Self {
        Self {
            response: json!({ "success": true }),
            effects,
        }
    }
}

/// Central coordinator holding state, the gatekeeper and the store.
pub struct App<S: SettingsStore> {
    settings: Settings,
    whitelist: BTreeSet<String>,
    stats: Stats,
    catalog: Arc<FilterCatalog>,
    gatekeeper: NetworkGatekeeper,
    store: S,
    domain_pattern: Regex,
}

impl<S: SettingsStore> App<S> {
    /// Creates the coordinator and loads persisted state from `store`.
    pub fn new(mut store: S, catalog: FilterCatalog) -> Result<Self, Box<dyn std::error::Error>> {
        let state = store.load()?;
        let domain_pattern = Regex::new(DOMAIN_PATTERN)?;
        let gatekeeper = NetworkGatekeeper::new(&catalog);
        info!(
            whitelisted = state.whitelist.len(),
            total_blocked = state.stats.total(),
            "coordinator state loaded"
        );
        Ok(Self {
            settings: state.settings,
            whitelist: state.whitelist,
            stats: state.stats,
            catalog: Arc::new(catalog),
            gatekeeper,
            store,
            domain_pattern,
        })
    }

    /// Replaces the gatekeeper, e.g. to point at a different interstitial page.
    pub fn with_gatekeeper(mut self, gatekeeper: NetworkGatekeeper) -> Self {
        self.gatekeeper = gatekeeper;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn whitelist(&self) -> &BTreeSet<String> {
        &self.whitelist
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn catalog(&self) -> Arc<FilterCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Badge for the current totals: the count, or empty when nothing was blocked.
    pub fn badge(&self) -> Effect {
        let total = self.stats.total();
        Effect::SetBadge {
            text: if total > 0 {
                total.to_string()
            } else {
                String::new()
            },
            color: BADGE_COLOR.to_string(),
        }
    }

    // ─── Browser events ───

    pub fn dispatch(&mut self, event: BrowserEvent) -> Vec<Effect> {
        match event {
            BrowserEvent::Request(details) => self.on_request(&details),
            BrowserEvent::Navigation(details) => self.on_navigation(&details),
            BrowserEvent::TabCreated(tab) => self.on_tab_created(&tab),
        }
    }

    fn on_request(&mut self, details: &RequestDetails) -> Vec<Effect> {
        match self
            .gatekeeper
            .check_request(details, &self.settings, &self.whitelist)
        {
            RequestVerdict::Allow => Vec::new(),
            RequestVerdict::Cancel { hostname, matched } => {
                info!(%hostname, %matched, "blocked ad request");
                self.stats.record_ads(1);
                self.commit(vec![Effect::CancelRequest])
            }
        }
    }

    fn on_navigation(&mut self, details: &NavigationDetails) -> Vec<Effect> {
        match self
            .gatekeeper
            .check_navigation(details, &self.settings, &self.whitelist)
        {
            NavigationVerdict::Allow => Vec::new(),
            NavigationVerdict::Intercept { interstitial_url } => {
                info!(tab_id = details.tab_id, target = %details.url, "blocked suspicious redirect");
                self.stats.record_redirect();
                self.commit(vec![Effect::RedirectTab {
                    tab_id: details.tab_id,
                    url: interstitial_url,
                }])
            }
        }
    }

    fn on_tab_created(&mut self, tab: &TabInfo) -> Vec<Effect> {
        if !is_popup_tab(tab, &self.settings) {
            return Vec::new();
        }
        info!(tab_id = tab.id, opener = ?tab.opener_tab_id, "closed popup tab");
        self.stats.record_popup();
        self.commit(vec![
            Effect::CloseTab { tab_id: tab.id },
            Effect::Notify {
                title: POPUP_NOTIFICATION_TITLE.to_string(),
                message: POPUP_NOTIFICATION_MESSAGE.to_string(),
            },
        ])
    }

    // ─── Action messages ───

    pub fn handle_message(&mut self, message: Message) -> Result<Outcome, AppError> {
        match message {
            Message::GetStats => to_reply(&self.stats),
            Message::GetSettings => to_reply(&self.settings),
            Message::GetWhitelist => to_reply(&self.whitelist),
            Message::UpdateSettings { settings } => {
                self.settings.merge(&settings);
                debug!(settings = ?self.settings, "settings updated");
                self.persist();
                Ok(Outcome::success(Vec::new()))
            }
            Message::AddToWhitelist { domain } => {
                let domain = domain.trim();
                if !self.domain_pattern.is_match(domain) {
                    return Err(AppError::InvalidDomain(domain.to_string()));
                }
                if self.whitelist.insert(domain.to_string()) {
                    info!(domain, "domain whitelisted");
                    self.persist();
                }
                Ok(Outcome::success(Vec::new()))
            }
            Message::RemoveFromWhitelist { domain } => {
                if self.whitelist.remove(domain.trim()) {
                    info!(domain = domain.trim(), "domain removed from whitelist");
                    self.persist();
                }
                Ok(Outcome::success(Vec::new()))
            }
            Message::AdRemoved { count } => {
                self.stats.record_ads(count);
                Ok(Outcome::success(self.commit(Vec::new())))
            }
            Message::PopupBlocked { url } => {
                debug!(url = ?url, "page blocked window.open");
                self.stats.record_popup();
                Ok(Outcome::success(self.commit(Vec::new())))
            }
            Message::SuspiciousRedirect { kind, content } => {
                info!(%kind, %content, "page removed suspicious redirect");
                self.stats.record_redirect();
                Ok(Outcome::success(self.commit(Vec::new())))
            }
        }
    }

    /// Persists after a stats change and appends the refreshed badge.
    fn commit(&mut self, mut effects: Vec<Effect>) -> Vec<Effect> {
        self.persist();
        effects.push(self.badge());
        effects
    }

    fn persist(&mut self) {
        let state = StoredState {
            settings: self.settings,
            whitelist: self.whitelist.clone(),
            stats: self.stats,
        };
        if let Err(e) = self.store.apply(StatePatch::full(&state)) {
            warn!(error = %e, "failed to persist state");
        }
    }
}

fn to_reply<T: serde::Serialize>(value: &T) -> Result<Outcome, AppError> {
    serde_json::to_value(value)
        .map(Outcome::reply)
        .map_err(|e| AppError::SerializationError(e.to_string()))
}
