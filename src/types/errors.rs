use std::fmt;

// === DomError ===

/// Errors reported by a page implementation while querying or editing elements.
#[derive(Debug, Clone, PartialEq)]
pub enum DomError {
    /// The selector string could not be parsed.
    InvalidSelector(String),
    /// The element handle no longer refers to a node in the page.
    DetachedNode(String),
    /// The host page reported a failure.
    Host(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::InvalidSelector(sel) => write!(f, "Invalid selector: {}", sel),
            DomError::DetachedNode(node) => write!(f, "Node is not attached: {}", node),
            DomError::Host(msg) => write!(f, "Page host error: {}", msg),
        }
    }
}

impl std::error::Error for DomError {}

// === StoreError ===

/// Errors related to persisting settings, whitelist and stats.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing the state file.
    IoError(String),
    /// Failed to serialize or deserialize the stored state.
    SerializationError(String),
    /// The store refused the write.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(msg) => write!(f, "Store I/O error: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// === CatalogError ===

/// Errors related to loading a filter catalog file.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    IoError(String),
    /// The catalog file is not valid JSON for a catalog.
    ParseError(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::IoError(msg) => write!(f, "Catalog I/O error: {}", msg),
            CatalogError::ParseError(msg) => write!(f, "Catalog parse error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

// === AppError ===

/// Errors returned by the background coordinator when handling a message.
#[derive(Debug)]
pub enum AppError {
    /// The domain does not look like a hostname.
    InvalidDomain(String),
    /// A reply could not be serialized.
    SerializationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidDomain(domain) => {
                write!(f, "Please enter a valid domain name: {}", domain)
            }
            AppError::SerializationError(msg) => {
                write!(f, "Reply serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {}
