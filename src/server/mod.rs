//! Development server for the generated site

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::commands;
use crate::Helios;

/// Build the router serving `public_dir`.
///
/// Unknown paths get the generated `404.html` with a 404 status.
pub fn router(public_dir: &Path) -> Router {
    let not_found = ServeFile::new(public_dir.join("404.html"));
    let files = ServeDir::new(public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found);

    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

/// Parse the bind address, handling "localhost" specially
fn bind_addr(ip: &str, port: u16) -> Result<SocketAddr> {
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    format!("{}:{}", bind_ip, port)
        .parse()
        .with_context(|| format!("Invalid address {}:{}", ip, port))
}

/// Start the development server.
///
/// With `watch`, the site is regenerated on a blocking thread whenever
/// content changes.
pub async fn start(helios: &Helios, ip: &str, port: u16, watch: bool) -> Result<()> {
    let addr = bind_addr(ip, port)?;
    let app = router(&helios.public_dir);

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let helios = helios.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = commands::generate::watch(&helios) {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
