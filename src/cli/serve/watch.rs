//! Rebuild on source changes for `lathe dev`.
//!
//! Every change triggers a full rebuild once events settle for
//! [`DEBOUNCE_MS`]. Editing `lathe.toml` reloads the config first.

use super::lifecycle::is_shutdown;
use crate::{
    cli::{Cli, build::build_site},
    config::SiteConfig,
    debug, log,
    logger::{status_error, status_success},
    utils::{path::normalize_path, plural::plural_count},
};
use anyhow::Result;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

/// Longest wait between shutdown checks.
const POLL_MS: u64 = 100;

/// Collects changed paths until they settle.
#[derive(Debug, Default)]
struct Debouncer {
    changes: BTreeSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    /// Record the paths of a relevant event. Paths under `ignored` (the
    /// output directory) never count.
    fn add_event(&mut self, event: &notify::Event, ignored: &Path) {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // metadata-only changes (mtime/chmod) would loop forever
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in &event.paths {
            if is_temp_file(path) || path.starts_with(ignored) {
                continue;
            }
            debug!("watch"; "{:?} {}", event.kind, path.display());
            self.changes.insert(normalize_path(path));
            self.last_event = Some(Instant::now());
        }
    }

    fn take_if_ready(&mut self) -> Option<BTreeSet<PathBuf>> {
        let last_event = self.last_event?;
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return None;
        }
        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        (!changes.is_empty()).then_some(changes)
    }

    fn sleep_duration(&self) -> Duration {
        let wait = self.last_event.map_or(Duration::from_millis(POLL_MS), |t| {
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(t.elapsed())
        });
        wait.clamp(Duration::from_millis(1), Duration::from_millis(POLL_MS))
    }
}

/// Editor swap and backup files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Start watching `config.watch_paths()` on a background thread.
///
/// The watcher is registered before returning so no change made after this
/// call is missed.
pub fn spawn_watcher(cli: &'static Cli, config: SiteConfig) -> Result<JoinHandle<()>> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })?;

    let paths = config.watch_paths();
    for path in &paths {
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode)?;
    }
    log!("watch"; "watching {}", plural_count(paths.len(), "path"));

    Ok(thread::spawn(move || run(cli, config, watcher, rx)))
}

fn run(
    cli: &'static Cli,
    mut config: SiteConfig,
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<notify::Result<notify::Event>>,
) {
    let mut debouncer = Debouncer::default();

    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(Ok(event)) => debouncer.add_event(&event, &config.build.output),
            Ok(Err(e)) => log!("watch"; "error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready() {
            rebuild(cli, &mut config, &changes);
        }
    }
}

fn rebuild(cli: &'static Cli, config: &mut SiteConfig, changes: &BTreeSet<PathBuf>) {
    if changes.contains(&config.config_path) {
        match SiteConfig::load(cli) {
            Ok(reloaded) => *config = reloaded,
            Err(e) => {
                status_error("config reload failed", &format!("{e:#}"));
                return;
            }
        }
    }

    let summary = match changes.len() {
        1 => changes
            .first()
            .map(|p| config.root_relative(p).display().to_string())
            .unwrap_or_default(),
        n => plural_count(n, "change"),
    };

    match build_site(config, cli.command.extra_groups(), true) {
        Ok(count) => status_success(&format!("{summary}: rebuilt {}", plural_count(count, "file"))),
        Err(e) => status_error(&format!("{summary}: build failed"), &format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("src/post.md.swp")));
        assert!(is_temp_file(Path::new("src/post.md~")));
        assert!(is_temp_file(Path::new("src/.post.md")));
        assert!(!is_temp_file(Path::new("src/post.md")));
    }

    #[test]
    fn test_debouncer_filters_events() {
        let mut debouncer = Debouncer::default();
        let output = Path::new("/site/build");

        debouncer.add_event(
            &event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)), "/site/src/a.md"),
            output,
        );
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/site/build/a.html"), output);
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/site/src/a.md.swp"), output);
        assert!(debouncer.changes.is_empty());
        assert!(debouncer.last_event.is_none());

        debouncer.add_event(
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "/site/src/a.md"),
            output,
        );
        assert_eq!(debouncer.changes.len(), 1);
    }

    #[test]
    fn test_debouncer_waits_for_quiet() {
        let mut debouncer = Debouncer::default();
        debouncer.add_event(
            &event(EventKind::Create(CreateKind::File), "/site/src/b.md"),
            Path::new("/site/build"),
        );
        assert!(debouncer.take_if_ready().is_none());

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 1));
        let changes = debouncer.take_if_ready().unwrap();
        assert_eq!(changes.len(), 1);
        assert!(debouncer.take_if_ready().is_none());
    }
}
