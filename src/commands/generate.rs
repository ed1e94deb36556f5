//! Generate static files

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::content::load_pages;
use crate::generator::{GenerateStats, Generator};
use crate::Helios;

/// Generate the static site from published posts and pages
pub fn run(helios: &Helios) -> Result<GenerateStats> {
    let start = Instant::now();

    let repository = helios.repository()?;
    let pages = load_pages(&helios.pages_dir);
    tracing::info!("Loaded {} pages", pages.len());

    let generator = Generator::new(helios)?;
    let stats = generator.generate(&repository, &pages)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(stats)
}

/// Paths whose changes trigger a rebuild
fn watched_paths(helios: &Helios) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths = vec![
        (helios.posts_dir.clone(), RecursiveMode::NonRecursive),
        (helios.pages_dir.clone(), RecursiveMode::NonRecursive),
        (helios.base_dir.join("_config.yml"), RecursiveMode::NonRecursive),
    ];
    if let Some(catalog) = &helios.catalog_path {
        paths.push((catalog.clone(), RecursiveMode::NonRecursive));
    }
    paths.retain(|(path, _)| path.exists());
    paths
}

/// Editor swap files and the like
fn is_noise(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.starts_with('.') || name.ends_with('~') || name.ends_with(".swp")
}

/// Quiet period after the last change before a rebuild starts
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Collapses a burst of file events into one rebuild.
///
/// A rebuild becomes due once no event has arrived for the whole window, so
/// the last change of a burst is never dropped.
#[derive(Debug)]
struct Debouncer {
    window: Duration,
    pending: Option<Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    fn record(&mut self, at: Instant) {
        self.pending = Some(at);
    }

    /// Whether a rebuild should start now; clears the pending change if so
    fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(last) if now.saturating_duration_since(last) >= self.window => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

/// Watch for file changes and regenerate.
///
/// Blocks until the watcher shuts down. The configuration is reloaded before
/// every rebuild.
pub fn watch(helios: &Helios) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for (path, mode) in watched_paths(helios) {
        watcher.watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut debouncer = Debouncer::new(DEBOUNCE);

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if !event.paths.iter().all(|p| is_noise(p)) {
                    tracing::debug!("Change: {:?}", event.paths);
                    debouncer.record(Instant::now());
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if debouncer.take_due(Instant::now()) {
            tracing::info!("File changed, regenerating...");
            match Helios::new(&helios.base_dir).and_then(|h| run(&h)) {
                Ok(stats) => tracing::info!("Regenerated {} posts", stats.posts),
                Err(e) => tracing::error!("Generation failed: {:#}", e),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_generates_site() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("hello.md"),
            "---\ntitle: \"Hello\"\ndate: \"2024-01-01\"\n---\n\nHi.\n",
        )
        .unwrap();

        let helios = Helios::new(tmp.path()).unwrap();
        let stats = run(&helios).unwrap();
        assert_eq!(stats.posts, 1);
        assert!(helios.public_dir.join("posts/hello/index.html").is_file());
    }

    #[test]
    fn test_watched_paths_skip_missing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("content/posts")).unwrap();
        let helios = Helios::new(tmp.path()).unwrap();

        let paths: Vec<PathBuf> = watched_paths(&helios)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec![helios.posts_dir.clone()]);
    }

    #[test]
    fn test_debouncer_waits_for_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEBOUNCE);
        assert!(!debouncer.take_due(start + Duration::from_secs(5)));

        debouncer.record(start);
        debouncer.record(start + Duration::from_millis(300));
        assert!(!debouncer.take_due(start + Duration::from_millis(600)));
        assert!(debouncer.take_due(start + Duration::from_millis(800)));
        assert!(!debouncer.take_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_debouncer_keeps_change_after_rebuild() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEBOUNCE);

        debouncer.record(start);
        assert!(debouncer.take_due(start + DEBOUNCE));

        // A second save right after the rebuild still gets its own rebuild
        debouncer.record(start + DEBOUNCE + Duration::from_millis(10));
        assert!(!debouncer.take_due(start + DEBOUNCE + Duration::from_millis(100)));
        assert!(debouncer.take_due(start + DEBOUNCE * 2 + Duration::from_millis(10)));
    }

    #[test]
    fn test_is_noise() {
        assert!(is_noise(Path::new("/site/content/posts/.hello.md.swp")));
        assert!(is_noise(Path::new("/site/content/posts/hello.md~")));
        assert!(!is_noise(Path::new("/site/content/posts/hello.md")));
    }
}
