//! Mutation Watcher for Calm Browsing Buddy.
//!
//! Owns a page and re-scans it: once at start, on every periodic tick, and
//! after a debounced burst of mutations. Scans run on the watcher's own
//! task one after another, so two scans never overlap. Each pass that hid
//! something is reported to the coordinator exactly once.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::dom::Page;
use crate::managers::scan_scheduler::{ScanScheduler, ScanTrigger};
use crate::services::page_scanner::PageScanner;
use crate::types::dom::{MutationRecord, ScanReport};
use crate::types::events::Message;

/// Edits the page on the watcher's task and describes what changed.
pub type PageEdit<P> = Box<dyn FnOnce(&mut P) -> MutationRecord>;

/// Notifications consumed by [`MutationWatcher::run`].
pub enum PageEvent<P> {
    /// The host already changed the DOM.
    Mutated(MutationRecord),
    /// A change the watcher applies to the page it owns.
    Edit(PageEdit<P>),
}

/// Totals across the watcher's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatcherSummary {
    pub scans: u64,
    pub periodic_scans: u64,
    pub debounced_scans: u64,
    pub removed: u64,
}

pub struct MutationWatcher<P: Page> {
    page: P,
    scanner: PageScanner,
    scheduler: ScanScheduler,
    summary: WatcherSummary,
}

impl<P: Page> MutationWatcher<P> {
    pub fn new(page: P, scanner: PageScanner, scheduler: ScanScheduler) -> Self {
        Self {
            page,
            scanner,
            scheduler,
            summary: WatcherSummary::default(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    pub fn summary(&self) -> WatcherSummary {
        self.summary
    }

    /// Runs until the event channel closes, then returns the watcher.
    ///
    /// `reports` receives `adRemoved` once per pass that hid anything and
    /// `suspiciousRedirect` for removed meta refreshes. A closed report
    /// channel is not an error; scanning continues.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<PageEvent<P>>,
        reports: mpsc::UnboundedSender<Message>,
    ) -> Self {
        let trigger = self.scheduler.start(Instant::now());
        self.scan(trigger, &reports);

        loop {
            let deadline = self
                .scheduler
                .next_deadline()
                .unwrap_or_else(Instant::now);
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("page event channel closed, stopping watcher");
                        break;
                    };
                    let record = match event {
                        PageEvent::Mutated(record) => record,
                        PageEvent::Edit(edit) => edit(&mut self.page),
                    };
                    if self.scheduler.on_mutation(record, Instant::now()) {
                        debug!(added = record.added_nodes, "mutation observed, scan deferred");
                    }
                }
                _ = sleep_until(deadline) => {
                    if let Some(trigger) = self.scheduler.poll(Instant::now()) {
                        self.scan(trigger, &reports);
                    }
                }
            }
        }
        self
    }

    /// Runs one scan pass immediately and reports it.
    pub fn scan(&mut self, trigger: ScanTrigger, reports: &mpsc::UnboundedSender<Message>) -> ScanReport {
        let report = self.scanner.scan(&mut self.page);
        self.summary.scans += 1;
        match trigger {
            ScanTrigger::Periodic => self.summary.periodic_scans += 1,
            ScanTrigger::Debounced => self.summary.debounced_scans += 1,
            ScanTrigger::Initial => {}
        }
        self.summary.removed += report.removed;

        if report.removed > 0 {
            info!(?trigger, removed = report.removed, "ads removed");
            if reports
                .send(Message::AdRemoved {
                    count: report.removed,
                })
                .is_err()
            {
                debug!(removed = report.removed, "report channel closed, ad count dropped");
            }
        }
        if let Some(content) = &report.meta_refresh {
            if reports
                .send(Message::SuspiciousRedirect {
                    kind: "meta-refresh".to_string(),
                    content: content.clone(),
                })
                .is_err()
            {
                debug!(%content, "report channel closed, meta refresh report dropped");
            }
        }
        report
    }
}
