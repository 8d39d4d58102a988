//! In-memory page backed by a parsed HTML document.
//!
//! Used by the demo CLI and by tests. The document tree comes from `scraper`;
//! everything a script would change at runtime (inline styles, flags, classes,
//! clicks, media position) is tracked in side tables keyed by node id so the
//! parsed tree itself stays untouched except for inserts and removals.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

use super::Page;
use crate::types::dom::{MediaState, MutationRecord, Rect};
use crate::types::errors::DomError;

const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

#[derive(Debug, Clone, Default)]
struct ElementOverrides {
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    hidden: Option<bool>,
    clicks: u32,
}

/// A parsed HTML document implementing [`Page`].
pub struct HtmlPage {
    html: Html,
    viewport_width: f64,
    overrides: HashMap<NodeId, ElementOverrides>,
    layouts: HashMap<NodeId, Rect>,
    media: HashMap<NodeId, MediaState>,
    selectors: RefCell<HashMap<String, Selector>>,
}

impl HtmlPage {
    /// Parses a full HTML document.
    pub fn parse(document: &str) -> Self {
        Self {
            html: Html::parse_document(document),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            overrides: HashMap::new(),
            layouts: HashMap::new(),
            media: HashMap::new(),
            selectors: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    /// First element matching `selector`, if any.
    pub fn first(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).ok()?.into_iter().next()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first("body")
    }

    /// Overrides the rendered size of an element.
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        self.layouts.insert(node, rect);
    }

    pub fn set_media(&mut self, node: NodeId, state: MediaState) {
        self.media.insert(node, state);
    }

    /// Current inline value of a style property.
    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        if let Some(value) = self
            .overrides
            .get(&node)
            .and_then(|o| o.styles.get(property))
        {
            return Some(value.clone());
        }
        let element = self.element(node).ok()?;
        let style = element.value().attr("style")?;
        parse_declarations(style)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    pub fn click_count(&self, node: NodeId) -> u32 {
        self.overrides.get(&node).map(|o| o.clicks).unwrap_or(0)
    }

    /// Parses `fragment` and appends its nodes as children of `parent`.
    ///
    /// Returns the mutation record a `MutationObserver` would report.
    pub fn insert_html(&mut self, parent: NodeId, fragment: &str) -> Result<MutationRecord, DomError> {
        if self.html.tree.get(parent).is_none() {
            return Err(DomError::DetachedNode(format!("{:?}", parent)));
        }
        let parsed = Html::parse_fragment(fragment);
        let root = parsed.root_element();
        let mut added_nodes = 0;
        for child in root.children() {
            self.graft(parent, child)?;
            added_nodes += 1;
        }
        Ok(MutationRecord { added_nodes })
    }

    fn graft(&mut self, parent: NodeId, source: NodeRef<'_, Node>) -> Result<NodeId, DomError> {
        let id = {
            let mut parent_mut = self
                .html
                .tree
                .get_mut(parent)
                .ok_or_else(|| DomError::DetachedNode(format!("{:?}", parent)))?;
            parent_mut.append(source.value().clone()).id()
        };
        for child in source.children() {
            self.graft(id, child)?;
        }
        Ok(id)
    }

    fn with_selector<R>(
        &self,
        selector: &str,
        f: impl FnOnce(&Selector) -> R,
    ) -> Result<R, DomError> {
        if let Some(cached) = self.selectors.borrow().get(selector) {
            return Ok(f(cached));
        }
        let parsed = Selector::parse(selector)
            .map_err(|e| DomError::InvalidSelector(format!("{}: {:?}", selector, e)))?;
        let out = f(&parsed);
        self.selectors
            .borrow_mut()
            .insert(selector.to_string(), parsed);
        Ok(out)
    }

    fn element(&self, node: NodeId) -> Result<ElementRef<'_>, DomError> {
        let node_ref = self
            .html
            .tree
            .get(node)
            .ok_or_else(|| DomError::DetachedNode(format!("{:?}", node)))?;
        if !self.is_attached(node_ref) {
            return Err(DomError::DetachedNode(format!("{:?}", node)));
        }
        ElementRef::wrap(node_ref)
            .ok_or_else(|| DomError::DetachedNode(format!("{:?} is not an element", node)))
    }

    fn is_attached(&self, node_ref: NodeRef<'_, Node>) -> bool {
        let root = self.html.tree.root().id();
        node_ref.id() == root || node_ref.ancestors().any(|a| a.id() == root)
    }

    fn overrides_mut(&mut self, node: NodeId) -> &mut ElementOverrides {
        self.overrides.entry(node).or_default()
    }

    fn dimension(&self, node: NodeId, name: &str) -> Option<f64> {
        if let Some(value) = self.inline_style(node, name) {
            if let Some(px) = parse_px(&value) {
                return Some(px);
            }
        }
        self.element(node)
            .ok()?
            .value()
            .attr(name)
            .and_then(parse_px)
    }
}

fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect()
}

fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim().trim_end_matches("!important").trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.trim().parse().ok()
}

impl Page for HtmlPage {
    type Node = NodeId;

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let root = self.html.root_element();
        self.with_selector(selector, |sel| root.select(sel).map(|e| e.id()).collect())
    }

    fn matches(&self, node: NodeId, selector: &str) -> Result<bool, DomError> {
        let element = self.element(node)?;
        self.with_selector(selector, |sel| sel.matches(&element))
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let element = self.element(node)?;
        self.with_selector(selector, |sel| {
            std::iter::once(element)
                .chain(element.ancestors().filter_map(ElementRef::wrap))
                .find(|candidate| sel.matches(candidate))
                .map(|found| found.id())
        })
    }

    fn has_descendant(&self, node: NodeId, selector: &str) -> Result<bool, DomError> {
        let element = self.element(node)?;
        self.with_selector(selector, |sel| {
            element
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .any(|d| sel.matches(&d))
        })
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node)
            .map(|e| e.value().name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        if let Some(value) = self
            .overrides
            .get(&node)
            .and_then(|o| o.attributes.get(name))
        {
            return Some(value.clone());
        }
        self.element(node)
            .ok()?
            .value()
            .attr(name)
            .map(str::to_string)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node)
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        if self
            .overrides
            .get(&node)
            .is_some_and(|o| o.classes.iter().any(|c| c == class))
        {
            return true;
        }
        self.element(node)
            .map(|e| e.value().classes().any(|c| c == class))
            .unwrap_or(false)
    }

    fn layout(&self, node: NodeId) -> Option<Rect> {
        if let Some(rect) = self.layouts.get(&node) {
            let mut rect = *rect;
            // Inline sizes written after the layout override win, like a reflow.
            if let Some(width) = self
                .overrides
                .get(&node)
                .and_then(|o| o.styles.get("width"))
                .and_then(|v| parse_px(v))
            {
                rect.width = width;
            }
            if let Some(height) = self
                .overrides
                .get(&node)
                .and_then(|o| o.styles.get("height"))
                .and_then(|v| parse_px(v))
            {
                rect.height = height;
            }
            return Some(rect);
        }
        match (self.dimension(node, "width"), self.dimension(node, "height")) {
            (None, None) => None,
            (width, height) => Some(Rect::new(width.unwrap_or(0.0), height.unwrap_or(0.0))),
        }
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        let display_none = self
            .inline_style(node, "display")
            .is_some_and(|v| v.trim().starts_with("none"));
        let hidden_flag = match self.overrides.get(&node).and_then(|o| o.hidden) {
            Some(flag) => flag,
            None => self
                .element(node)
                .map(|e| e.value().attr("hidden").is_some())
                .unwrap_or(false),
        };
        display_none || hidden_flag
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        let element = match self.element(node) {
            Ok(e) => e,
            Err(_) => return false,
        };
        if self.is_hidden(node) {
            return false;
        }
        !element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| self.is_hidden(a.id()))
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.overrides_mut(node)
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.overrides_mut(node)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.overrides_mut(node).hidden = Some(hidden);
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let overrides = self.overrides_mut(node);
        if !overrides.classes.iter().any(|c| c == class) {
            overrides.classes.push(class.to_string());
        }
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(mut node_mut) = self.html.tree.get_mut(node) {
            node_mut.detach();
        }
    }

    fn click(&mut self, node: NodeId) {
        self.overrides_mut(node).clicks += 1;
    }

    fn media_state(&self, node: NodeId) -> Option<MediaState> {
        self.media.get(&node).copied()
    }

    fn seek(&mut self, node: NodeId, time: f64) {
        if let Some(state) = self.media.get_mut(&node) {
            state.current_time = time;
        }
    }
}
