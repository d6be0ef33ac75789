use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc::{self, Sender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use walkdir::WalkDir;

use crate::config::Configuration;
use crate::events::PoolEvent;
use crate::pool::PoolItem;

const RESCAN_DEBOUNCE: Duration = Duration::from_millis(250);

/// Scan the clip library and append configured URLs, producing the pool in a
/// stable order (paths sorted, then URLs in config order).
pub fn scan_library(cfg: &Configuration) -> Result<Vec<PoolItem>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(&cfg.clip_library_path)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path().to_path_buf();
        if is_video(&path, &cfg.video_extensions) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items: Vec<PoolItem> = paths.into_iter().map(PoolItem::from_file).collect();
    items.extend(cfg.clip_urls.iter().map(PoolItem::from_url));
    Ok(items)
}

/// Pool-selection task: scans the library at startup, re-scans on filesystem
/// changes, and emits a full pool replacement each time.
#[instrument(
    skip(cfg, to_manager, cancel),
    fields(root = %cfg.clip_library_path.display())
)]
pub async fn run(
    cfg: Configuration,
    to_manager: Sender<PoolEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    // 1) Startup scan -> pool replacement
    let items = scan_library(&cfg)?;
    info!(discovered = items.len(), "startup library scan complete");
    write_recent_names(&cfg, &items);
    let _ = to_manager.send(PoolEvent::Replaced(items)).await;

    // 2) Bridge notify callback -> async channel
    let (watch_tx, mut watch_rx) = mpsc::channel::<notify::Result<Event>>(128);
    let mut _watcher = recommended_watcher(move |res| {
        let _ = watch_tx.blocking_send(res);
    })?;
    match cfg.clip_library_path.canonicalize() {
        Ok(abs) => info!(watching = %abs.display(), "notify watcher initialized (recursive)"),
        Err(_) => {
            info!(watching = %cfg.clip_library_path.display(), "notify watcher initialized (recursive)")
        }
    }
    _watcher.watch(&cfg.clip_library_path, RecursiveMode::Recursive)?;

    // 3) Event loop; bursts of notifications coalesce into one debounced rescan
    let mut rescan_at: Option<Instant> = None;
    loop {
        let deadline = rescan_at;
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting files task");
                break;
            }

            Some(res) = watch_rx.recv() => match res {
                Ok(event) => {
                    debug!(kind = ?event.kind, paths = ?event.paths, "notify event");
                    if touches_pool(&event, &cfg.video_extensions) {
                        rescan_at = Some(Instant::now() + RESCAN_DEBOUNCE);
                    }
                }
                Err(err) => error!("watch error: {err}"),
            },

            _ = async move { tokio::time::sleep_until(deadline.unwrap()).await },
                if deadline.is_some() =>
            {
                rescan_at = None;
                let items = scan_library(&cfg)?;
                info!(discovered = items.len(), "library re-scan complete");
                write_recent_names(&cfg, &items);
                if to_manager.send(PoolEvent::Replaced(items)).await.is_err() {
                    warn!("manager channel closed");
                    break;
                }
            }
        }
    }
    Ok(())
}

fn touches_pool(event: &Event, extensions: &[String]) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(CreateKind::File)
            | EventKind::Remove(RemoveKind::File)
            | EventKind::Modify(ModifyKind::Name(_))
    );
    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| is_video(p.as_path(), extensions))
}

fn is_video(p: &Path, extensions: &[String]) -> bool {
    match p.extension().and_then(OsStr::to_str) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| *e == ext)
        }
        None => false,
    }
}

/// Best-effort cache of the last-selected clip names, kept across restarts
/// purely as a convenience. Failures are logged, never fatal.
fn write_recent_names(cfg: &Configuration, items: &[PoolItem]) {
    let Some(path) = cfg.recent_names_cache.as_ref() else {
        return;
    };
    let mut names = items.iter().map(PoolItem::key).collect::<Vec<_>>().join("\n");
    names.push('\n');
    if let Err(err) = fs::write(path, names) {
        warn!(path = %path.display(), "failed to write recent-names cache: {err}");
    }
}
