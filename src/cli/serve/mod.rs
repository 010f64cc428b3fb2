//! Local static file server for `dev` and `prod`.
//!
//! Serves `[build] output` as written by the last build. `dev` also starts
//! the watcher, which rebuilds into the same directory.

mod lifecycle;
mod path;
mod response;
mod watch;

pub use lifecycle::{is_shutdown, setup_shutdown_handler};

use crate::{cli::Cli, config::SiteConfig, log};
use anyhow::{Context, Result};
use std::{path::Path, sync::Arc};
use tiny_http::{Method, Request, Server};

/// Worker threads answering requests.
const REQUEST_THREADS: usize = 4;

/// Serve the output directory until Ctrl+C.
pub fn serve_site(cli: &'static Cli, config: &SiteConfig) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server(Arc::clone(&server));

    let watcher = if config.serve.watch {
        Some(watch::spawn_watcher(cli, config.clone())?)
    } else {
        None
    };

    log!("serve"; "http://{}", addr);
    run_request_loop(&server, &config.build.output)?;

    if let Some(handle) = watcher {
        let _ = handle.join();
    }
    Ok(())
}

fn run_request_loop(server: &Server, output: &Path) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    let output: Arc<Path> = Arc::from(output);
    for request in server.incoming_requests() {
        let output = Arc::clone(&output);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &output) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request.
fn handle_request(request: Request, output: &Path) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    match path::resolve_path(request.url(), output) {
        Some(path) => response::respond_file(request, &path),
        None => response::respond_not_found(request, output),
    }
}
