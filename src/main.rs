//! Calm Browsing Buddy command-line demo.
//!
//! `calm-buddy scan <file.html> [--viewport <px>]` runs one scan pass over a
//! saved page and prints the report. `calm-buddy check <url>` prints the
//! verdict the gatekeeper gives a request to `url`.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use calm_buddy::dom::HtmlPage;
use calm_buddy::logging::init_logging;
use calm_buddy::services::filter_catalog::load_catalog;
use calm_buddy::services::network_gatekeeper::{
    NetworkGatekeeper, NetworkGatekeeperTrait, RequestVerdict,
};
use calm_buddy::services::page_scanner::PageScanner;
use calm_buddy::types::events::RequestDetails;
use calm_buddy::types::settings::Settings;

type CliResult = Result<(), Box<dyn std::error::Error>>;

const USAGE: &str = "usage:
  calm-buddy scan <file.html> [--viewport <px>]
  calm-buddy check <url>";

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn scan(path: &Path, viewport: Option<f64>) -> CliResult {
    let document = std::fs::read_to_string(path)?;
    let mut page = HtmlPage::parse(&document);
    if let Some(width) = viewport {
        page = page.with_viewport_width(width);
    }
    let scanner = PageScanner::new(Arc::new(load_catalog(None)?));
    let report = scanner.scan(&mut page);

    section(&format!("Scan: {}", path.display()));
    println!("  Hidden elements:    {}", report.removed);
    println!("  Skipped selectors:  {}", report.skipped_selectors);
    println!("  Failed elements:    {}", report.failed_elements);
    println!("  Skip button clicked: {}", report.skip_ad_clicked);
    println!("  Ad fast-forwarded:  {}", report.ad_fast_forwarded);
    if let Some(content) = &report.meta_refresh {
        println!("  Meta refresh removed: {}", content);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn check(url: &str) -> CliResult {
    let gatekeeper = NetworkGatekeeper::new(&load_catalog(None)?);
    let details = RequestDetails {
        url: url.to_string(),
        tab_id: None,
        resource_type: Some("script".to_string()),
        initiator: None,
    };
    section(&format!("Check: {}", url));
    match gatekeeper.check_request(&details, &Settings::default(), &BTreeSet::new()) {
        RequestVerdict::Allow => println!("  allow"),
        RequestVerdict::Cancel { hostname, matched } => {
            println!("  cancel ({} matched {})", hostname, matched)
        }
    }
    Ok(())
}

fn run(args: &[String]) -> CliResult {
    match args {
        [cmd, file] if cmd == "scan" => scan(Path::new(file), None),
        [cmd, file, flag, width] if cmd == "scan" && flag == "--viewport" => {
            scan(Path::new(file), Some(width.parse()?))
        }
        [cmd, url] if cmd == "check" => check(url),
        _ => Err(USAGE.into()),
    }
}

fn main() -> ExitCode {
    if let Err(e) = init_logging("warn") {
        eprintln!("failed to initialise logging: {}", e);
    }
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
