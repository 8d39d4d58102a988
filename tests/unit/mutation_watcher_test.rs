//! Watcher tests on a paused tokio clock.
//!
//! The watcher owns a non-`Send` page, so it is driven with `tokio::join!`
//! on the test's own task rather than spawned.

use std::sync::Arc;
use std::time::Duration;

use calm_buddy::dom::HtmlPage;
use calm_buddy::managers::mutation_watcher::{MutationWatcher, PageEvent};
use calm_buddy::managers::scan_scheduler::{ScanScheduler, ScanTrigger};
use calm_buddy::services::page_scanner::PageScanner;
use calm_buddy::types::catalog::FilterCatalog;
use calm_buddy::types::dom::MutationRecord;
use calm_buddy::types::events::Message;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn watcher(html: &str, interval: Duration) -> MutationWatcher<HtmlPage> {
    MutationWatcher::new(
        HtmlPage::parse(html),
        PageScanner::new(Arc::new(FilterCatalog::default())),
        ScanScheduler::new(interval, Duration::from_millis(500)),
    )
}

fn insert_ad(n: usize) -> PageEvent<HtmlPage> {
    PageEvent::Edit(Box::new(move |page: &mut HtmlPage| {
        let feed = page.first("#feed").expect("feed element");
        page.insert_html(feed, &format!(r#"<div class="ad-banner">ad {}</div>"#, n))
            .expect("insert into attached feed")
    }))
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn burst_of_mutations_coalesces_into_one_scan() {
    let watcher = watcher(r#"<body><div id="feed"></div></body>"#, Duration::from_secs(60));
    let (tx, rx) = mpsc::channel(16);
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();

    let driver = async move {
        for n in 0..5 {
            tx.send(insert_ad(n)).await.expect("watcher alive");
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_secs(1)).await;
    };
    let (watcher, ()) = tokio::join!(watcher.run(rx, report_tx), driver);

    let summary = watcher.summary();
    assert_eq!(summary.scans, 2, "initial scan plus one debounced scan");
    assert_eq!(summary.debounced_scans, 1);
    assert_eq!(summary.periodic_scans, 0);
    assert_eq!(summary.removed, 5);
    assert_eq!(drain(&mut report_rx), vec![Message::AdRemoved { count: 5 }]);
}

#[tokio::test(start_paused = true)]
async fn periodic_scans_run_without_mutations() {
    let watcher = watcher(r#"<body><div id="feed"></div></body>"#, Duration::from_secs(1));
    let (tx, rx) = mpsc::channel::<PageEvent<HtmlPage>>(4);
    let (report_tx, _report_rx) = mpsc::unbounded_channel();

    let driver = async move {
        sleep(Duration::from_millis(3500)).await;
        drop(tx);
    };
    let (watcher, ()) = tokio::join!(watcher.run(rx, report_tx), driver);

    let summary = watcher.summary();
    assert_eq!(summary.periodic_scans, 3);
    assert_eq!(summary.debounced_scans, 0);
    assert_eq!(summary.scans, 4);
}

#[tokio::test(start_paused = true)]
async fn mutation_without_added_nodes_does_not_schedule_a_scan() {
    let watcher = watcher(r#"<body><div id="feed"></div></body>"#, Duration::from_secs(60));
    let (tx, rx) = mpsc::channel(4);
    let (report_tx, _report_rx) = mpsc::unbounded_channel();

    let driver = async move {
        tx.send(PageEvent::Mutated(MutationRecord { added_nodes: 0 }))
            .await
            .expect("watcher alive");
        sleep(Duration::from_secs(2)).await;
    };
    let (watcher, ()) = tokio::join!(watcher.run(rx, report_tx), driver);
    assert_eq!(watcher.summary().scans, 1);
}

#[tokio::test(start_paused = true)]
async fn initial_scan_reports_ads_and_meta_refresh() {
    let watcher = watcher(
        r#"<html><head><meta http-equiv="refresh" content="5;url=https://ads.example.net/"></head>
        <body><div class="ad-banner">x</div><div id="feed"></div></body></html>"#,
        Duration::from_secs(60),
    );
    let (tx, rx) = mpsc::channel::<PageEvent<HtmlPage>>(1);
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    drop(tx);

    let watcher = watcher.run(rx, report_tx).await;
    assert_eq!(watcher.summary().scans, 1);
    assert_eq!(
        drain(&mut report_rx),
        vec![
            Message::AdRemoved { count: 1 },
            Message::SuspiciousRedirect {
                kind: "meta-refresh".to_string(),
                content: "5;url=https://ads.example.net/".to_string(),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn closed_report_channel_does_not_stop_scanning() {
    let mut watcher = watcher(
        r#"<body><div class="ad-banner">x</div><div id="feed"></div></body>"#,
        Duration::from_secs(60),
    );
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    drop(report_rx);

    let report = watcher.scan(ScanTrigger::Initial, &report_tx);
    assert_eq!(report.removed, 1);
    assert_eq!(watcher.summary().removed, 1);

    let (tx, rx) = mpsc::channel(4);
    let driver = async move {
        tx.send(insert_ad(7)).await.expect("watcher alive");
        sleep(Duration::from_secs(1)).await;
    };
    let (watcher, ()) = tokio::join!(watcher.run(rx, report_tx), driver);
    assert_eq!(watcher.summary().removed, 2);
}
