//! Page Scanner for Calm Browsing Buddy.
//!
//! One scan pass runs the classify → mitigate pipeline over every candidate
//! element, then handles video ads, ad iframes and meta-refresh redirects.
//! A failing element or selector is logged and skipped; the pass always
//! completes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dom::Page;
use crate::services::dom_mitigator::MitigationTally;
use crate::services::element_classifier::ElementClassifier;
use crate::types::catalog::FilterCatalog;
use crate::types::dom::{ClassificationResult, ScanReport};
use crate::types::errors::DomError;

const TEXT_CANDIDATES: &str = "div, span, p, article";
const SKIP_BUTTON_SELECTOR: &str = ".ytp-ad-skip-button, .ytp-skip-ad-button";
const AD_COUNTDOWN_SELECTOR: &str = ".ytp-ad-duration-remaining";
const META_REFRESH_SELECTOR: &str = "meta[http-equiv=\"refresh\"]";
/// Only ads shorter than this many seconds are fast-forwarded.
const MAX_SKIPPABLE_AD_SECONDS: f64 = 30.0;
/// Ad iframes at least this large may be the main video and are kept.
const IFRAME_MAIN_WIDTH: f64 = 728.0;
const IFRAME_MAIN_HEIGHT: f64 = 300.0;

/// Runs scan passes over a page with a shared catalog.
#[derive(Debug, Clone)]
pub struct PageScanner {
    catalog: Arc<FilterCatalog>,
}

impl PageScanner {
    pub fn new(catalog: Arc<FilterCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    /// Runs one full scan pass.
    pub fn scan<P: Page>(&self, page: &mut P) -> ScanReport {
        let mut report = ScanReport::default();
        let mut tally = MitigationTally::new();
        let classifier = ElementClassifier::new(&self.catalog);

        let attribute_selectors: Vec<String> = self.catalog.attribute_selectors().collect();
        let selectors = self
            .catalog
            .selectors
            .iter()
            .chain(attribute_selectors.iter())
            .map(String::as_str);
        let candidates = collect_candidates(page, selectors, &mut report);
        self.mitigate_ads(page, &classifier, candidates, &mut tally, &mut report);

        self.remove_video_ads(page, &classifier, &mut tally, &mut report);
        self.remove_ad_iframes(page, &classifier, &mut tally, &mut report);

        let text_nodes = collect_candidates(page, [TEXT_CANDIDATES], &mut report);
        self.mitigate_ads(page, &classifier, text_nodes, &mut tally, &mut report);

        skip_video_ads(page, &mut report);
        strip_meta_refresh(page, &mut report);

        report.removed = tally.removed();
        if report.removed > 0 {
            debug!(removed = report.removed, "scan pass hid ads");
        }
        report
    }

    fn mitigate_ads<P: Page>(
        &self,
        page: &mut P,
        classifier: &ElementClassifier<'_>,
        candidates: Vec<P::Node>,
        tally: &mut MitigationTally,
        report: &mut ScanReport,
    ) {
        for node in candidates {
            match classifier.try_classify(page, node) {
                Ok(ClassificationResult::Ad) => {
                    tally.mitigate(page, node);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(?node, error = %e, "classification failed, skipping element");
                    report.failed_elements += 1;
                }
            }
        }
    }

    fn remove_video_ads<P: Page>(
        &self,
        page: &mut P,
        classifier: &ElementClassifier<'_>,
        tally: &mut MitigationTally,
        report: &mut ScanReport,
    ) {
        let selectors = self.catalog.video_ad_selectors.iter().map(String::as_str);
        for node in collect_candidates(page, selectors, report) {
            match classifier.is_removable_video_ad(page, node) {
                Ok(true) => {
                    tally.mitigate(page, node);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(?node, error = %e, "video ad check failed, skipping element");
                    report.failed_elements += 1;
                }
            }
        }
    }

    fn remove_ad_iframes<P: Page>(
        &self,
        page: &mut P,
        classifier: &ElementClassifier<'_>,
        tally: &mut MitigationTally,
        report: &mut ScanReport,
    ) {
        let selectors = self.catalog.ad_iframe_selectors.iter().map(String::as_str);
        for node in collect_candidates(page, selectors, report) {
            match classifier.is_protected_player(page, node) {
                Ok(false) => {}
                Ok(true) => continue,
                Err(e) => {
                    warn!(?node, error = %e, "player check failed, skipping iframe");
                    report.failed_elements += 1;
                    continue;
                }
            }
            // Without layout the frame cannot be the main video.
            let small = page.layout(node).map_or(true, |r| {
                r.width < IFRAME_MAIN_WIDTH || r.height < IFRAME_MAIN_HEIGHT
            });
            if small {
                tally.mitigate(page, node);
            }
        }
    }
}

/// Elements matched by any selector, deduplicated, in first-seen order.
fn collect_candidates<'s, P: Page>(
    page: &P,
    selectors: impl IntoIterator<Item = &'s str>,
    report: &mut ScanReport,
) -> Vec<P::Node> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    for selector in selectors {
        match page.query_all(selector) {
            Ok(found) => {
                for node in found {
                    if seen.insert(node) {
                        nodes.push(node);
                    }
                }
            }
            Err(DomError::InvalidSelector(msg)) => {
                debug!(selector, error = %msg, "skipping unsupported selector");
                report.skipped_selectors += 1;
            }
            Err(e) => {
                warn!(selector, error = %e, "selector query failed");
                report.skipped_selectors += 1;
            }
        }
    }
    nodes
}

fn first<P: Page>(page: &P, selector: &str) -> Option<P::Node> {
    page.query_all(selector).ok()?.into_iter().next()
}

/// Clicks a visible skip-ad control and fast-forwards short ads.
/// Missing controls or videos are not errors.
fn skip_video_ads<P: Page>(page: &mut P, report: &mut ScanReport) {
    if let Some(button) = first(page, SKIP_BUTTON_SELECTOR) {
        if page.is_rendered(button) {
            page.click(button);
            report.skip_ad_clicked = true;
        }
    }

    if first(page, AD_COUNTDOWN_SELECTOR).is_none() {
        return;
    }
    let Some(video) = first(page, "video") else {
        return;
    };
    if let Some(state) = page.media_state(video) {
        if !state.paused && state.duration < MAX_SKIPPABLE_AD_SECONDS {
            page.seek(video, state.duration - 0.1);
            report.ad_fast_forwarded = true;
        }
    }
}

/// Removes a `<meta http-equiv="refresh">` that redirects elsewhere.
fn strip_meta_refresh<P: Page>(page: &mut P, report: &mut ScanReport) {
    let Some(meta) = first(page, META_REFRESH_SELECTOR) else {
        return;
    };
    let Some(content) = page.attribute(meta, "content") else {
        return;
    };
    if content.to_ascii_lowercase().contains("url=") {
        info!(content = %content, "removed meta refresh redirect");
        page.remove(meta);
        report.meta_refresh = Some(content);
    }
}
