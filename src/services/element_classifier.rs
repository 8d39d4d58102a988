//! Element Classifier for Calm Browsing Buddy.
//!
//! Decides whether a page element is a removable ad, a protected video
//! player, or ordinary content. Player protection is checked first and
//! always wins over ad matches.

use tracing::debug;

use crate::dom::Page;
use crate::types::catalog::{FilterCatalog, BLOCKED_MARKER_CLASS};
use crate::types::dom::ClassificationResult;
use crate::types::errors::DomError;

/// Elements larger than this share of the viewport width are treated as main content.
const MAX_AD_WIDTH_RATIO: f64 = 0.8;
/// Keyword matches only count for elements smaller than this footprint.
const KEYWORD_MAX_WIDTH: f64 = 500.0;
const KEYWORD_MAX_HEIGHT: f64 = 300.0;
/// Tags whose text content is inspected for ad keywords.
const TEXT_TAGS: &[&str] = &["div", "span", "p", "article"];
/// Containers that put an element "inside the video".
const VIDEO_CONTAINERS: &[&str] = &["video", ".video-player", ".player"];
/// Inside a video container, only these are hidden.
const OVERLAY_SELECTORS: &[&str] = &[".overlay", ".ad-overlay", "[class*=\"ad-\"]"];

/// Classifies page elements against a filter catalog.
pub struct ElementClassifier<'a> {
    catalog: &'a FilterCatalog,
}

impl<'a> ElementClassifier<'a> {
    pub fn new(catalog: &'a FilterCatalog) -> Self {
        Self { catalog }
    }

    /// Classifies one element, treating any page failure as ordinary content.
    pub fn classify<P: Page>(&self, page: &P, node: P::Node) -> ClassificationResult {
        self.try_classify(page, node)
            .unwrap_or(ClassificationResult::OrdinaryContent)
    }

    /// Classifies one element.
    ///
    /// Malformed selectors are skipped; any other page error is returned so the
    /// caller can drop this element and keep scanning.
    pub fn try_classify<P: Page>(
        &self,
        page: &P,
        node: P::Node,
    ) -> Result<ClassificationResult, DomError> {
        if self.is_protected_player(page, node)? {
            return Ok(ClassificationResult::ProtectedPlayer);
        }

        let attribute_selectors: Vec<String> = self.catalog.attribute_selectors().collect();
        let selector_hit =
            matches_any(page, node, self.catalog.selectors.iter().map(String::as_str))?
                || matches_any(page, node, attribute_selectors.iter().map(String::as_str))?;

        if (selector_hit || self.is_keyword_candidate(page, node))
            && self.passes_placement_checks(page, node)?
        {
            return Ok(ClassificationResult::Ad);
        }

        Ok(ClassificationResult::OrdinaryContent)
    }

    /// The element is a player, sits inside one, or contains one.
    pub fn is_protected_player<P: Page>(&self, page: &P, node: P::Node) -> Result<bool, DomError> {
        let players = || self.catalog.player_selectors.iter().map(String::as_str);
        Ok(matches_any(page, node, players())?
            || closest_any(page, node, players())?
            || has_descendant_any(page, node, players())?)
    }

    /// Whether a video-ad overlay candidate may be hidden.
    ///
    /// Players themselves are kept. Inside a video container only overlay-like
    /// elements qualify.
    pub fn is_removable_video_ad<P: Page>(&self, page: &P, node: P::Node) -> Result<bool, DomError> {
        let players = || self.catalog.player_selectors.iter().map(String::as_str);
        if matches_any(page, node, players())? || has_descendant_any(page, node, players())? {
            return Ok(false);
        }
        if closest_any(page, node, VIDEO_CONTAINERS.iter().copied())? {
            return matches_any(page, node, OVERLAY_SELECTORS.iter().copied());
        }
        Ok(!is_already_hidden(page, node))
    }

    /// Content, size and visibility checks shared by every ad rule.
    pub fn passes_placement_checks<P: Page>(&self, page: &P, node: P::Node) -> Result<bool, DomError> {
        let containers = self.catalog.content_containers.iter().map(String::as_str);
        if closest_any(page, node, containers)? {
            return Ok(false);
        }
        if let Some(rect) = page.layout(node) {
            if rect.width > page.viewport_width() * MAX_AD_WIDTH_RATIO {
                return Ok(false);
            }
        }
        Ok(!is_already_hidden(page, node))
    }

    fn is_keyword_candidate<P: Page>(&self, page: &P, node: P::Node) -> bool {
        let tag = page.tag_name(node);
        if !TEXT_TAGS.contains(&tag.as_str()) {
            return false;
        }
        let small = page
            .layout(node)
            .is_some_and(|r| r.width < KEYWORD_MAX_WIDTH && r.height < KEYWORD_MAX_HEIGHT);
        if !small {
            return false;
        }
        let text = page.text_content(node).to_lowercase();
        self.catalog.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Hidden inline, flagged hidden, or already carrying the mitigation marker.
pub fn is_already_hidden<P: Page>(page: &P, node: P::Node) -> bool {
    page.has_class(node, BLOCKED_MARKER_CLASS) || page.is_hidden(node)
}

fn skip_invalid(selector: &str, result: Result<bool, DomError>) -> Result<bool, DomError> {
    match result {
        Err(DomError::InvalidSelector(msg)) => {
            debug!(selector, error = %msg, "skipping unsupported selector");
            Ok(false)
        }
        other => other,
    }
}

fn matches_any<'s, P: Page>(
    page: &P,
    node: P::Node,
    selectors: impl IntoIterator<Item = &'s str>,
) -> Result<bool, DomError> {
    for selector in selectors {
        if skip_invalid(selector, page.matches(node, selector))? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn closest_any<'s, P: Page>(
    page: &P,
    node: P::Node,
    selectors: impl IntoIterator<Item = &'s str>,
) -> Result<bool, DomError> {
    for selector in selectors {
        let found = page.closest(node, selector).map(|n| n.is_some());
        if skip_invalid(selector, found)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn has_descendant_any<'s, P: Page>(
    page: &P,
    node: P::Node,
    selectors: impl IntoIterator<Item = &'s str>,
) -> Result<bool, DomError> {
    for selector in selectors {
        if skip_invalid(selector, page.has_descendant(node, selector))? {
            return Ok(true);
        }
    }
    Ok(false)
}
