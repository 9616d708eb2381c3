use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use super::site::{build_into, load_site};

#[derive(Clone)]
struct AppState {
    reload_tx: broadcast::Sender<()>,
}

/// Start preview server with hot reload for local development.
///
/// This command:
/// - Builds the site, with the live-reload script, into a temp directory
/// - Serves that directory
/// - Watches the site for changes, rebuilds and tells the browser to reload
///
/// # Arguments
///
/// * `path` - Path to site directory containing folio.toml
/// * `port` - Port to serve on (default: 8080)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("📝 Starting preview server...");
    println!("   Site: {}", path.display());

    let site = load_site(&path)?;
    let output = tempfile::tempdir().context("Failed to create preview directory")?;
    let summary = build_into(&site, output.path(), true)?;

    println!("   ✓ Loaded: {}", site.config.site.title);
    println!("   ✓ Posts: {}", site.posts.len());
    println!("   ✓ Pages: {}", summary.pages);

    // Create broadcast channel for reload events
    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        reload_tx: reload_tx.clone(),
    };

    let app = Router::new()
        .route("/_reload", get(sse_handler))
        .fallback_service(ServeDir::new(output.path()))
        .with_state(state);

    // Start file watcher
    let watcher_path = path.clone();
    let ignored = path.join(&site.config.build.output_dir);
    let output_path = output.path().to_path_buf();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, ignored, output_path, reload_tx).await {
            eprintln!("File watcher error: {}", e);
        }
    });

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Rebuild the preview output from scratch so removed pages stop being served
fn rebuild(path: &Path, output: &Path) -> Result<()> {
    let site = load_site(path)?;
    clear_dir(output)?;
    build_into(&site, output, true)?;
    Ok(())
}

/// Remove everything inside `dir`, keeping the directory itself
fn clear_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Whether a changed path should trigger a rebuild
fn is_relevant_change(changed: &Path, ignored: &Path) -> bool {
    if changed.starts_with(ignored) {
        return false;
    }
    let filename = changed.file_name().unwrap_or_default().to_string_lossy();
    !filename.starts_with('.') && !filename.ends_with('~')
}

/// Watch for file changes, rebuild and trigger reload
async fn watch_files(
    path: PathBuf,
    ignored: PathBuf,
    output: PathBuf,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    // Watch site directory recursively
    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                if event.paths.iter().any(|p| is_relevant_change(p, &ignored)) {
                    println!("   📝 File changed, rebuilding...");
                    match rebuild(&path, &output) {
                        Ok(()) => {
                            let _ = reload_tx.send(());
                        }
                        Err(e) => eprintln!("   ⚠ Rebuild failed: {:#}", e),
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) => {
                    yield Ok(Event::default().data("reload"));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
