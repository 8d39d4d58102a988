use serde::{Deserialize, Serialize};

/// Marker class added to every mitigated element.
pub const BLOCKED_MARKER_CLASS: &str = "calm-buddy-blocked";

/// Static filter data used to recognize advertising content.
///
/// Every list is ordered and checked front to back. Missing keys in a catalog
/// file fall back to the built-in lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterCatalog {
    /// CSS selectors for generic ad containers.
    pub selectors: Vec<String>,
    /// Hostname substrings for ad and tracking servers.
    pub domains: Vec<String>,
    /// Attribute names that only ad slots carry.
    pub attributes: Vec<String>,
    /// Lowercase phrases typical of ad copy.
    pub keywords: Vec<String>,
    /// Overlays, companions and countdowns around video ads.
    pub video_ad_selectors: Vec<String>,
    /// Selectors that identify video players. Matching elements are never hidden.
    pub player_selectors: Vec<String>,
    /// Containers holding the main page content.
    pub content_containers: Vec<String>,
    /// Iframes serving ads.
    pub ad_iframe_selectors: Vec<String>,
    /// EasyList-syntax network rules, consulted when the `network` feature is on.
    pub network_rules: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self {
            selectors: owned(&[
                // Generic ad classes
                "[class*=\"ad-\"]", "[id*=\"ad-\"]", "[class*=\"ads-\"]", "[id*=\"ads-\"]",
                ".advertisement", ".ad-banner", ".popup-ad", ".sponsored",
                ".ad-container", ".ad-wrapper", ".ad-content", ".ad-block",
                // Google
                "[class*=\"google-ad\"]", ".adsbygoogle", "ins.adsbygoogle",
                // Ad networks
                "[class*=\"doubleclick\"]", ".adsystem", "[data-ad-client]",
                // Social
                "[data-testid*=\"ad\"]", "[aria-label*=\"Sponsored\"]",
                // Banner positions
                ".top-banner", ".side-banner", ".bottom-banner",
                ".header-ad", ".footer-ad", ".sidebar-ad",
            ]),
            domains: owned(&[
                "doubleclick.net", "googlesyndication.com", "googleadservices.com",
                "amazon-adsystem.com", "facebook.com/tr", "googletagmanager.com",
            ]),
            attributes: owned(&[
                "data-ad-slot", "data-ad-client", "data-ad-format",
                "data-google-ad-client", "data-amazon-ad-tag",
            ]),
            keywords: owned(&[
                "advertisement", "sponsored by", "promoted by",
                "ads by", "click here", "buy now", "limited time",
            ]),
            video_ad_selectors: owned(&[
                ".video-ads", ".preroll-ads", ".midroll-ads", ".postroll-ads",
                ".ad-overlay", ".video-ad-overlay", ".player-ad-overlay",
                ".companion-ad", ".video-companion-ad", ".player-companion",
                ".skip-ad", ".video-skip-ad", ".ad-skip-button",
                ".ad-countdown", ".ad-timer", ".ad-progress",
                ".video-ad-banner", ".ad-notice", ".advertisement-notice",
                ".sponsored-content-overlay", ".promoted-video-overlay",
                ".ytp-ad-overlay-container", ".ytp-ad-text-overlay",
                ".html5-video-ad-overlay", ".jwplayer-ad-overlay",
            ]),
            player_selectors: owned(&[
                "video", ".video-player", ".player", ".video-container",
                ".html5-video-player", ".jwplayer", ".flowplayer",
                "[id*=\"player\"]", "[class*=\"player\"]",
            ]),
            content_containers: owned(&["article", "main", ".content", ".post"]),
            ad_iframe_selectors: owned(&[
                "iframe[src*=\"ads\"]",
                "iframe[src*=\"doubleclick\"]",
                "iframe[src*=\"googlesyndication\"]",
            ]),
            network_rules: Vec::new(),
        }
    }
}

impl FilterCatalog {
    /// `[attr]` selectors for every ad attribute.
    pub fn attribute_selectors(&self) -> impl Iterator<Item = String> + '_ {
        self.attributes.iter().map(|attr| format!("[{}]", attr))
    }
}
