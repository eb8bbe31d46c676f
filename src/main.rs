mod catalog;
mod db;
mod engine;
mod ipc;
mod ledger;
mod model;
mod plan;

use log::{debug, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn main() {
    // stdout carries the protocol; logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("VERTRETUNGD_LOG", "warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut state = ipc::AppState {
        workspace: None,
        db: None,
    };

    if let Some(path) = std::env::var_os("VERTRETUNGD_WORKSPACE").map(PathBuf::from) {
        if let Err(e) = ipc::select_workspace(&mut state, &path) {
            warn!("could not open workspace {}: {e:#}", path.display());
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo back.
                let resp = ipc::err("", "bad_json", e.to_string(), None);
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        debug!("request {} {}", req.id, req.action);
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp)
                .unwrap_or_else(|_| "{\"success\":false,\"error\":\"encode failed\"}".to_string())
        );
        let _ = stdout.flush();
    }
}
