//! Classification tests over parsed HTML pages.
//!
//! Player protection always wins over ad matches, and every ad rule is
//! subject to the content-container, width and visibility checks.

use calm_buddy::dom::{HtmlPage, Page};
use calm_buddy::services::element_classifier::{is_already_hidden, ElementClassifier};
use calm_buddy::types::catalog::FilterCatalog;
use calm_buddy::types::dom::{ClassificationResult, Rect};
use rstest::rstest;

fn classify(html: &str, target: &str) -> ClassificationResult {
    let page = HtmlPage::parse(html);
    let catalog = FilterCatalog::default();
    let node = page.first(target).expect("target element");
    ElementClassifier::new(&catalog).classify(&page, node)
}

#[rstest]
#[case::generic_class(r#"<body><div id="t" class="ad-banner">x</div></body>"#)]
#[case::adsense(r#"<body><ins id="t" class="adsbygoogle"></ins></body>"#)]
#[case::ad_attribute(r#"<body><div id="t" data-ad-slot="1234"></div></body>"#)]
#[case::sponsored_label(r#"<body><div id="t" aria-label="Sponsored post">x</div></body>"#)]
#[case::small_keyword_text(r#"<body><p id="t" style="width:320px;height:60px">Ads by Example</p></body>"#)]
fn recognised_ads(#[case] html: &str) {
    assert_eq!(classify(html, "#t"), ClassificationResult::Ad);
}

#[rstest]
#[case::player_itself(r#"<body><div id="t" class="video-player ad-banner"></div></body>"#)]
#[case::inside_player(r#"<body><div class="jwplayer"><div id="t" class="ad-banner">x</div></div></body>"#)]
#[case::contains_video(r#"<body><div id="t" class="ad-container"><video></video></div></body>"#)]
fn player_protection_wins(#[case] html: &str) {
    assert_eq!(classify(html, "#t"), ClassificationResult::ProtectedPlayer);
}

#[rstest]
#[case::inside_article(r#"<body><article><div id="t" class="ad-banner">x</div></article></body>"#)]
#[case::inside_main(r#"<body><main><div id="t" class="sponsored">x</div></main></body>"#)]
#[case::already_hidden(r#"<body><div id="t" class="ad-banner" style="display: none">x</div></body>"#)]
#[case::hidden_attribute(r#"<body><div id="t" class="ad-banner" hidden>x</div></body>"#)]
#[case::plain_text(r#"<body><p id="t" style="width:320px;height:60px">Weather today</p></body>"#)]
#[case::keyword_in_large_block(r#"<body><div id="t" style="width:700px;height:400px">Buy now</div></body>"#)]
#[case::keyword_without_layout(r#"<body><div id="t">Buy now</div></body>"#)]
#[case::keyword_on_link(r#"<body><a id="t" style="width:100px;height:20px">Buy now</a></body>"#)]
fn ordinary_content(#[case] html: &str) {
    assert_eq!(classify(html, "#t"), ClassificationResult::OrdinaryContent);
}

#[test]
fn wide_element_is_treated_as_main_content() {
    let mut page = HtmlPage::parse(r#"<body><div id="t" class="ad-banner">x</div></body>"#)
        .with_viewport_width(1000.0);
    let node = page.first("#t").unwrap();
    let catalog = FilterCatalog::default();
    let classifier = ElementClassifier::new(&catalog);

    page.set_layout(node, Rect::new(801.0, 90.0));
    assert_eq!(
        classifier.classify(&page, node),
        ClassificationResult::OrdinaryContent
    );

    page.set_layout(node, Rect::new(800.0, 90.0));
    assert_eq!(classifier.classify(&page, node), ClassificationResult::Ad);
}

#[test]
fn overlay_inside_video_container_is_removable() {
    let page = HtmlPage::parse(
        r#"<body><div class="video-player">
            <div id="overlay" class="ad-overlay">Ad</div>
            <div id="countdown" class="ad-countdown-label">3</div>
            <div id="controls" class="controls skip-ad">Skip</div>
        </div>
        <div id="companion" class="companion-ad">Buy</div></body>"#,
    );
    let catalog = FilterCatalog::default();
    let classifier = ElementClassifier::new(&catalog);

    let removable = |sel: &str| {
        classifier
            .is_removable_video_ad(&page, page.first(sel).unwrap())
            .unwrap()
    };
    assert!(removable("#overlay"));
    assert!(removable("#countdown"));
    assert!(!removable("#controls"));
    assert!(removable("#companion"));
    assert!(!removable(".video-player"));
}

#[test]
fn marker_class_counts_as_hidden() {
    let page = HtmlPage::parse(r#"<body><div id="t" class="calm-buddy-blocked">x</div></body>"#);
    let node = page.first("#t").unwrap();
    assert!(is_already_hidden(&page, node));
    assert!(!page.is_hidden(node));
}
