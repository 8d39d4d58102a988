//! Unit tests for the RPC handler, covering every method dispatched by `handle_method`.
//!
//! These go through the same code path as the `calm-buddy-host` binary, with
//! the coordinator persisting into a temporary directory.

use std::sync::Mutex;

use serde_json::json;
use tempfile::TempDir;

use calm_buddy::app::App;
use calm_buddy::rpc_handler::handle_method;
use calm_buddy::services::settings_store::JsonFileStore;
use calm_buddy::types::catalog::FilterCatalog;

fn setup() -> (Mutex<App<JsonFileStore>>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = JsonFileStore::new(Some(tmp.path().join("state.json")));
    let app = App::new(store, FilterCatalog::default()).expect("Failed to init App");
    (Mutex::new(app), tmp)
}

// ─── Ping ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).unwrap();
    assert_eq!(res["pong"], true);
}

// ─── Unknown method ───

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "bookmark.add", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Messages ───

#[test]
fn test_get_stats_and_settings() {
    let (app, _tmp) = setup();
    let stats = handle_method(&app, "message", &json!({"action": "getStats"})).unwrap();
    assert_eq!(
        stats["response"],
        json!({"adsBlocked": 0, "popupsBlocked": 0, "redirectsBlocked": 0})
    );
    let settings = handle_method(&app, "message", &json!({"action": "getSettings"})).unwrap();
    assert_eq!(
        settings["response"],
        json!({"adBlocking": true, "popupBlocking": true, "redirectBlocking": true})
    );
}

#[test]
fn test_update_settings_merges_partial() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "message",
        &json!({"action": "updateSettings", "settings": {"popupBlocking": false}}),
    )
    .unwrap();
    assert_eq!(res["response"], json!({"success": true}));

    let settings = handle_method(&app, "message", &json!({"action": "getSettings"})).unwrap();
    assert_eq!(settings["response"]["popupBlocking"], false);
    assert_eq!(settings["response"]["adBlocking"], true);
}

#[test]
fn test_whitelist_add_list_remove() {
    let (app, _tmp) = setup();
    for domain in ["news.example.org", "example.com"] {
        handle_method(
            &app,
            "message",
            &json!({"action": "addToWhitelist", "domain": domain}),
        )
        .unwrap();
    }
    let list = handle_method(&app, "message", &json!({"action": "getWhitelist"})).unwrap();
    assert_eq!(list["response"], json!(["example.com", "news.example.org"]));

    handle_method(
        &app,
        "message",
        &json!({"action": "removeFromWhitelist", "domain": "example.com"}),
    )
    .unwrap();
    let list = handle_method(&app, "message", &json!({"action": "getWhitelist"})).unwrap();
    assert_eq!(list["response"], json!(["news.example.org"]));
}

#[test]
fn test_invalid_whitelist_domain_is_rejected() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "message",
        &json!({"action": "addToWhitelist", "domain": "not a domain"}),
    )
    .unwrap_err();
    assert!(err.contains("valid domain"));
}

#[test]
fn test_page_reports_update_badge() {
    let (app, _tmp) = setup();
    handle_method(&app, "message", &json!({"action": "adRemoved", "count": 2})).unwrap();
    handle_method(
        &app,
        "message",
        &json!({"action": "suspiciousRedirect", "type": "meta-refresh", "content": "0;url=https://x.example/"}),
    )
    .unwrap();
    let res = handle_method(
        &app,
        "message",
        &json!({"action": "popupBlocked", "url": "https://pop.example/"}),
    )
    .unwrap();
    assert_eq!(
        res["effects"],
        json!([{"type": "setBadge", "text": "4", "color": "#3b82f6"}])
    );
}

#[test]
fn test_unknown_action_is_invalid_params() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "message", &json!({"action": "selfDestruct"})).unwrap_err();
    assert!(err.starts_with("invalid params"));
}

// ─── Browser events ───

#[test]
fn test_request_event_returns_cancel() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "request",
        &json!({"url": "https://ads.doubleclick.net/x", "tabId": 1}),
    )
    .unwrap();
    assert_eq!(res["effects"][0], json!({"type": "cancelRequest"}));
}

#[test]
fn test_navigation_event_returns_redirect() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "navigation",
        &json!({
            "tabId": 5,
            "frameId": 0,
            "url": "https://tracker.example.com/redirect?to=x",
            "currentUrl": "https://shop.example.com/"
        }),
    )
    .unwrap();
    assert_eq!(res["effects"][0]["type"], "redirectTab");
    assert_eq!(res["effects"][0]["tabId"], 5);
}

#[test]
fn test_tab_created_event_returns_close() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "tabCreated",
        &json!({"id": 9, "openerTabId": 2, "active": false}),
    )
    .unwrap();
    assert_eq!(res["effects"][0], json!({"type": "closeTab", "tabId": 9}));
    assert_eq!(res["effects"][1]["type"], "notify");
}

#[test]
fn test_missing_params_is_an_error() {
    let (app, _tmp) = setup();
    assert!(handle_method(&app, "tabCreated", &json!({})).is_err());
}
