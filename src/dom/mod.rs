// Calm Browsing Buddy page abstraction
// The scanner only talks to a page through the `Page` trait so the same
// classification runs against a live browser DOM or a parsed HTML document.

pub mod html_page;

use std::fmt::Debug;
use std::hash::Hash;

use crate::types::dom::{MediaState, Rect};
use crate::types::errors::DomError;

pub use html_page::HtmlPage;

/// Read and write access to a rendered document.
///
/// Selector arguments are plain CSS selector strings. Implementations return
/// `DomError::InvalidSelector` for strings they cannot evaluate.
pub trait Page {
    /// Cheap handle to one element of the page.
    type Node: Copy + Eq + Hash + Debug;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, DomError>;
    /// Whether the element itself matches `selector`.
    fn matches(&self, node: Self::Node, selector: &str) -> Result<bool, DomError>;
    /// The element or its nearest ancestor matching `selector`.
    fn closest(&self, node: Self::Node, selector: &str) -> Result<Option<Self::Node>, DomError>;
    /// Whether any descendant matches `selector`.
    fn has_descendant(&self, node: Self::Node, selector: &str) -> Result<bool, DomError>;

    /// Lowercase tag name.
    fn tag_name(&self, node: Self::Node) -> String;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;
    fn text_content(&self, node: Self::Node) -> String;
    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    /// Rendered size, or `None` when the host has no layout for the element.
    fn layout(&self, node: Self::Node) -> Option<Rect>;
    fn viewport_width(&self) -> f64;
    /// Inline `display: none` or the `hidden` flag.
    fn is_hidden(&self, node: Self::Node) -> bool;
    /// Whether the element takes part in rendering (no hidden ancestor).
    fn is_rendered(&self, node: Self::Node) -> bool;

    fn set_style(&mut self, node: Self::Node, property: &str, value: &str);
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);
    fn set_hidden(&mut self, node: Self::Node, hidden: bool);
    fn add_class(&mut self, node: Self::Node, class: &str);
    /// Detach the element from the document.
    fn remove(&mut self, node: Self::Node);
    fn click(&mut self, node: Self::Node);

    fn media_state(&self, node: Self::Node) -> Option<MediaState>;
    fn seek(&mut self, node: Self::Node, time: f64);
}
