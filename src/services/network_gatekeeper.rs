//! Network Gatekeeper for Calm Browsing Buddy.
//!
//! Decides, per outgoing request and per top-level navigation, whether the
//! coordinator should cancel or intercept it. Stateless across events: all
//! inputs (settings, whitelist) are passed in by the caller.

use std::collections::BTreeSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;
use url::Url;

use crate::types::catalog::FilterCatalog;
use crate::types::events::{NavigationDetails, RequestDetails};
use crate::types::settings::Settings;

/// Default interstitial page shown instead of a flagged navigation.
pub const DEFAULT_INTERSTITIAL: &str = "chrome-extension://calm-buddy/interstitial.html";
/// URL fragments that mark a cross-site navigation as a likely ad redirect.
const REDIRECT_MARKERS: &[&str] = &["click", "redirect", "ads"];
/// Characters `encodeURIComponent` leaves as they are.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Verdict for an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestVerdict {
    Allow,
    Cancel { hostname: String, matched: String },
}

/// Verdict for a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationVerdict {
    Allow,
    Intercept { interstitial_url: String },
}

/// Trait defining gatekeeper operations.
pub trait NetworkGatekeeperTrait {
    fn check_request(
        &self,
        details: &RequestDetails,
        settings: &Settings,
        whitelist: &BTreeSet<String>,
    ) -> RequestVerdict;
    fn check_navigation(
        &self,
        details: &NavigationDetails,
        settings: &Settings,
        whitelist: &BTreeSet<String>,
    ) -> NavigationVerdict;
    fn is_suspicious_redirect(&self, from: &str, to: &str, whitelist: &BTreeSet<String>) -> bool;
    fn interstitial_url(&self, blocked: &str, from: &str) -> Option<String>;
}

/// Gatekeeper matching hostnames against the catalog's domain list.
pub struct NetworkGatekeeper {
    domains: Vec<String>,
    interstitial: String,
    #[cfg(feature = "network")]
    rules: Option<easylist::EasyListRules>,
}

impl NetworkGatekeeper {
    pub fn new(catalog: &FilterCatalog) -> Self {
        Self {
            domains: catalog.domains.iter().map(|d| d.to_lowercase()).collect(),
            interstitial: DEFAULT_INTERSTITIAL.to_string(),
            #[cfg(feature = "network")]
            rules: easylist::EasyListRules::compile(&catalog.network_rules),
        }
    }

    /// Uses a different base URL for the interstitial page.
    pub fn with_interstitial(mut self, base: &str) -> Self {
        self.interstitial = base.to_string();
        self
    }

    fn matching_domain(&self, url: &Url) -> Option<String> {
        let hostname = url.host_str()?.to_lowercase();
        // Entries such as `facebook.com/tr` carry a path and match host + path.
        let host_and_path = format!("{}{}", hostname, url.path());
        self.domains
            .iter()
            .find(|d| {
                if d.contains('/') {
                    host_and_path.contains(d.as_str())
                } else {
                    hostname.contains(d.as_str())
                }
            })
            .cloned()
    }

    #[cfg(feature = "network")]
    fn matching_rule(&self, details: &RequestDetails) -> Option<String> {
        let rules = self.rules.as_ref()?;
        rules
            .matches(details)
            .then(|| "easylist".to_string())
    }

    #[cfg(not(feature = "network"))]
    fn matching_rule(&self, _details: &RequestDetails) -> Option<String> {
        None
    }
}

fn hostname(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|h| h.to_lowercase())
}

/// A host is whitelisted when it equals an entry or is a subdomain of one.
pub fn is_whitelisted(host: &str, whitelist: &BTreeSet<String>) -> bool {
    whitelist.iter().any(|entry| {
        let entry = entry.trim().trim_start_matches('.').to_lowercase();
        !entry.is_empty()
            && (host == entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    })
}

impl NetworkGatekeeperTrait for NetworkGatekeeper {
    fn check_request(
        &self,
        details: &RequestDetails,
        settings: &Settings,
        whitelist: &BTreeSet<String>,
    ) -> RequestVerdict {
        if !settings.ad_blocking {
            return RequestVerdict::Allow;
        }
        let url = match Url::parse(&details.url) {
            Ok(url) => url,
            Err(e) => {
                debug!(url = %details.url, error = %e, "unparsable request url, allowing");
                return RequestVerdict::Allow;
            }
        };
        let Some(host) = url.host_str().map(|h| h.to_lowercase()) else {
            return RequestVerdict::Allow;
        };
        if is_whitelisted(&host, whitelist) {
            return RequestVerdict::Allow;
        }
        match self
            .matching_domain(&url)
            .or_else(|| self.matching_rule(details))
        {
            Some(matched) => RequestVerdict::Cancel {
                hostname: host,
                matched,
            },
            None => RequestVerdict::Allow,
        }
    }

    fn check_navigation(
        &self,
        details: &NavigationDetails,
        settings: &Settings,
        whitelist: &BTreeSet<String>,
    ) -> NavigationVerdict {
        if !settings.redirect_blocking || details.frame_id != 0 {
            return NavigationVerdict::Allow;
        }
        let Some(current) = details.current_url.as_deref().filter(|u| !u.is_empty()) else {
            return NavigationVerdict::Allow;
        };
        if !self.is_suspicious_redirect(current, &details.url, whitelist) {
            return NavigationVerdict::Allow;
        }
        match self.interstitial_url(&details.url, current) {
            Some(interstitial_url) => NavigationVerdict::Intercept { interstitial_url },
            None => NavigationVerdict::Allow,
        }
    }

    /// Different hostname AND target not whitelisted AND the target URL
    /// contains `click`, `redirect` or `ads`.
    fn is_suspicious_redirect(&self, from: &str, to: &str, whitelist: &BTreeSet<String>) -> bool {
        let (Some(from_host), Some(to_host)) = (hostname(from), hostname(to)) else {
            debug!(from, to, "unparsable navigation url, allowing");
            return false;
        };
        from_host != to_host
            && !is_whitelisted(&to_host, whitelist)
            && REDIRECT_MARKERS.iter().any(|marker| to.contains(marker))
    }

    /// `<interstitial>?blocked=<target>&from=<origin>`, both encoded the
    /// way `encodeURIComponent` does so the page can `decodeURIComponent` them.
    fn interstitial_url(&self, blocked: &str, from: &str) -> Option<String> {
        let mut url = Url::parse(&self.interstitial).ok()?;
        url.set_query(None);
        url.set_fragment(None);
        Some(format!(
            "{}?blocked={}&from={}",
            url,
            utf8_percent_encode(blocked, URI_COMPONENT),
            utf8_percent_encode(from, URI_COMPONENT)
        ))
    }
}

#[cfg(feature = "network")]
mod easylist {
    //! EasyList-syntax rules evaluated with the adblock engine.

    use adblock::lists::FilterSet;
    use adblock::Engine;
    use tracing::info;

    use crate::types::events::RequestDetails;

    pub struct EasyListRules {
        engine: Engine,
    }

    impl EasyListRules {
        /// Compiles `rules`; a list without any rule yields no engine.
        /// Rules the engine cannot parse are dropped by the engine itself.
        pub fn compile(rules: &[String]) -> Option<Self> {
            let rules: Vec<&str> = rules
                .iter()
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .collect();
            if rules.is_empty() {
                return None;
            }
            let mut filter_set = FilterSet::new(false);
            filter_set.add_filters(rules.iter(), Default::default());
            info!(rules = rules.len(), "compiled network filter rules");
            Some(Self {
                engine: Engine::from_filter_set(filter_set, true),
            })
        }

        pub fn matches(&self, details: &RequestDetails) -> bool {
            let source = details.initiator.as_deref().unwrap_or(&details.url);
            let request_type = details.resource_type.as_deref().unwrap_or("other");
            match adblock::request::Request::new(&details.url, source, request_type) {
                Ok(request) => self.engine.check_network_request(&request).matched,
                Err(_) => false,
            }
        }
    }
}
