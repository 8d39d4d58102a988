//! Property-based tests for the scan scheduler's debounce.
//!
//! A burst of mutations whose gaps are all shorter than the debounce window
//! produces exactly one debounced scan, due one window after the last mutation.

use std::time::Duration;

use calm_buddy::managers::scan_scheduler::{ScanScheduler, ScanTrigger};
use calm_buddy::types::dom::MutationRecord;
use proptest::prelude::*;
use tokio::time::Instant;

const DEBOUNCE_MS: u64 = 500;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn burst_yields_single_debounced_scan(
        gaps in proptest::collection::vec(0u64..DEBOUNCE_MS, 1..30),
        added in proptest::collection::vec(1usize..10, 30),
    ) {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        let mut scheduler = ScanScheduler::new(Duration::from_secs(3600), debounce);
        let start = Instant::from_std(std::time::Instant::now());
        let mut now = start;
        prop_assert_eq!(scheduler.start(now), ScanTrigger::Initial);

        for (gap, added_nodes) in gaps.iter().zip(added.iter()) {
            now += Duration::from_millis(*gap);
            prop_assert_eq!(scheduler.poll(now), None);
            let record = MutationRecord { added_nodes: *added_nodes };
            prop_assert!(scheduler.on_mutation(record, now));
        }

        let last = now;
        prop_assert_eq!(scheduler.poll(last + debounce - Duration::from_millis(1)), None);
        prop_assert_eq!(scheduler.poll(last + debounce), Some(ScanTrigger::Debounced));
        prop_assert!(!scheduler.has_pending());
        prop_assert_eq!(scheduler.poll(last + debounce + Duration::from_millis(1)), None);
    }

    #[test]
    fn empty_batches_never_schedule(count in 1usize..20) {
        let mut scheduler = ScanScheduler::new(Duration::from_secs(3600), Duration::from_millis(DEBOUNCE_MS));
        let now = Instant::from_std(std::time::Instant::now());
        scheduler.start(now);
        for _ in 0..count {
            let record = MutationRecord { added_nodes: 0 };
            prop_assert!(!scheduler.on_mutation(record, now));
        }
        prop_assert!(!scheduler.has_pending());
    }
}
