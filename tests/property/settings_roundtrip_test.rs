//! Property-based tests for persisted state.
//!
//! Any state written through the file store is read back unchanged, and a
//! settings patch only touches the fields it carries.

use calm_buddy::services::settings_store::{JsonFileStore, SettingsStore};
use calm_buddy::types::settings::{Settings, SettingsPatch, StatePatch, Stats, StoredState};
use proptest::prelude::*;
use tempfile::TempDir;

fn arb_settings() -> impl Strategy<Value = Settings> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(ad, popup, redirect)| Settings {
        ad_blocking: ad,
        popup_blocking: popup,
        redirect_blocking: redirect,
    })
}

fn arb_state() -> impl Strategy<Value = StoredState> {
    (
        arb_settings(),
        proptest::collection::btree_set("[a-z][a-z0-9-]{0,10}\\.(com|org|net)", 0..8),
        (any::<u64>(), any::<u64>(), any::<u64>()),
    )
        .prop_map(|(settings, whitelist, (ads, popups, redirects))| StoredState {
            settings,
            whitelist,
            stats: Stats {
                ads_blocked: ads,
                popups_blocked: popups,
                redirects_blocked: redirects,
            },
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn file_store_roundtrip(state in arb_state()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut writer = JsonFileStore::new(Some(path.clone()));
        writer.load().unwrap();
        writer.apply(StatePatch::full(&state)).unwrap();

        let mut reader = JsonFileStore::new(Some(path));
        prop_assert_eq!(reader.load().unwrap(), state);
    }

    #[test]
    fn settings_patch_touches_only_given_fields(
        base in arb_settings(),
        ad in any::<Option<bool>>(),
        popup in any::<Option<bool>>(),
        redirect in any::<Option<bool>>(),
    ) {
        let patch = SettingsPatch { ad_blocking: ad, popup_blocking: popup, redirect_blocking: redirect };
        let mut merged = base;
        merged.merge(&patch);

        prop_assert_eq!(merged.ad_blocking, ad.unwrap_or(base.ad_blocking));
        prop_assert_eq!(merged.popup_blocking, popup.unwrap_or(base.popup_blocking));
        prop_assert_eq!(merged.redirect_blocking, redirect.unwrap_or(base.redirect_blocking));
    }

    #[test]
    fn partial_state_patch_keeps_other_keys(state in arb_state(), whitelist in proptest::collection::btree_set("[a-z]{3,8}\\.com", 0..4)) {
        let mut merged = state.clone();
        merged.merge(StatePatch { whitelist: Some(whitelist.clone()), ..StatePatch::default() });
        prop_assert_eq!(merged.settings, state.settings);
        prop_assert_eq!(merged.stats, state.stats);
        prop_assert_eq!(&merged.whitelist, &whitelist);
    }
}
