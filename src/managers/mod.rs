pub mod mutation_watcher;
pub mod scan_scheduler;
