use calm_buddy::types::errors::*;

// === DomError Tests ===

#[test]
fn dom_error_display_variants() {
    assert_eq!(
        DomError::InvalidSelector("div[".to_string()).to_string(),
        "Invalid selector: div["
    );
    assert_eq!(
        DomError::DetachedNode("NodeId(4)".to_string()).to_string(),
        "Node is not attached: NodeId(4)"
    );
    assert_eq!(
        DomError::Host("layout unavailable".to_string()).to_string(),
        "Page host error: layout unavailable"
    );
}

#[test]
fn dom_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(DomError::Host("gone".to_string()));
    assert!(err.source().is_none());
}

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(
        StoreError::IoError("disk full".to_string()).to_string(),
        "Store I/O error: disk full"
    );
    assert_eq!(
        StoreError::SerializationError("bad json".to_string()).to_string(),
        "Store serialization error: bad json"
    );
    assert_eq!(
        StoreError::Unavailable("quota".to_string()).to_string(),
        "Store unavailable: quota"
    );
}

// === CatalogError Tests ===

#[test]
fn catalog_error_display_variants() {
    assert_eq!(
        CatalogError::IoError("missing".to_string()).to_string(),
        "Catalog I/O error: missing"
    );
    assert_eq!(
        CatalogError::ParseError("line 1".to_string()).to_string(),
        "Catalog parse error: line 1"
    );
}

// === AppError Tests ===

#[test]
fn app_error_invalid_domain_display() {
    let err = AppError::InvalidDomain("-nope".to_string());
    assert_eq!(err.to_string(), "Please enter a valid domain name: -nope");
}

#[test]
fn app_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> =
        Box::new(AppError::SerializationError("boom".to_string()));
    assert_eq!(err.to_string(), "Reply serialization error: boom");
}
