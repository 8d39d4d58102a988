pub mod dom_mitigator;
pub mod element_classifier;
pub mod filter_catalog;
pub mod network_gatekeeper;
pub mod page_scanner;
pub mod popup_heuristic;
pub mod settings_store;
