//! Calm Browsing Buddy native host: JSON over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"request", "params":{"url":"https://ads.doubleclick.net/x"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Logs go to stderr so stdout carries only protocol lines.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use calm_buddy::app::App;
use calm_buddy::logging::init_logging;
use calm_buddy::rpc_handler::handle_method;
use calm_buddy::services::filter_catalog::load_catalog;
use calm_buddy::services::settings_store::JsonFileStore;

use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(None)?;
    let store = JsonFileStore::new(None);
    info!(state = %store.path().display(), "starting native host");
    let app = Mutex::new(App::new(store, catalog)?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    emit(
        &mut out,
        &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}),
    )?;

    let mut rate_limiter = RateLimiter::new(200);

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparsable request line");
                emit(&mut out, &json!({"id":null,"error":format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&mut out, &json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                warn!(method, error = %err, "request failed");
                json!({"id": id, "error": err})
            }
        };
        emit(&mut out, &response)?;
    }
    info!("stdin closed, shutting down");
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = init_logging("info") {
        eprintln!("failed to initialise logging: {}", e);
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "native host stopped");
            ExitCode::FAILURE
        }
    }
}
