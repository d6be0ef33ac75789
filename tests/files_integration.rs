use std::fs;
use std::time::Duration;

use clipwall::config::Configuration;
use clipwall::events::PoolEvent;
use clipwall::pool::PoolItem;
use clipwall::tasks::files;
use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn pool_keys(items: &[PoolItem]) -> Vec<String> {
    items.iter().map(|i| i.key().to_string()).collect()
}

async fn recv_pool(rx: &mut mpsc::Receiver<PoolEvent>) -> Vec<PoolItem> {
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timeout waiting for pool event")
        .expect("pool channel closed");
    let PoolEvent::Replaced(items) = event;
    items
}

#[test]
fn scan_orders_paths_and_appends_urls() {
    let tmp = tempdir().unwrap();
    let lib = tmp.path().join("lib");
    fs::create_dir_all(lib.join("nested")).unwrap();
    fs::write(lib.join("d.MOV"), b"x").unwrap();
    fs::write(lib.join("a.mp4"), b"x").unwrap();
    fs::write(lib.join("nested").join("b.webm"), b"x").unwrap();
    fs::write(lib.join("notes.txt"), b"x").unwrap();

    let cfg = Configuration {
        clip_library_path: lib,
        clip_urls: vec!["https://example.com/e.mp4".to_string()],
        ..Configuration::default()
    };

    let items = files::scan_library(&cfg).unwrap();
    assert_eq!(
        pool_keys(&items),
        vec!["a.mp4", "d.MOV", "b.webm", "https://example.com/e.mp4"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn startup_scan_emits_pool_and_writes_name_cache() {
    let tmp = tempdir().unwrap();
    let lib = tmp.path().join("lib");
    fs::create_dir_all(&lib).unwrap();
    fs::write(lib.join("a.mp4"), b"x").unwrap();
    fs::write(lib.join("b.webm"), b"x").unwrap();
    fs::write(lib.join("skip.txt"), b"x").unwrap();
    let cache = tmp.path().join("recent.txt");

    let cfg = Configuration {
        clip_library_path: lib,
        recent_names_cache: Some(cache.clone()),
        ..Configuration::default()
    };

    let (pool_tx, mut pool_rx) = mpsc::channel::<PoolEvent>(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(files::run(cfg, pool_tx, cancel.clone()));

    let items = recv_pool(&mut pool_rx).await;
    assert_eq!(pool_keys(&items), vec!["a.mp4", "b.webm"]);

    let cached = fs::read_to_string(&cache).unwrap();
    assert_eq!(cached, "a.mp4\nb.webm\n");

    cancel.cancel();
    let _ = handle.await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn new_clip_triggers_a_pool_replacement() {
    let tmp = tempdir().unwrap();
    let lib = tmp.path().join("lib");
    fs::create_dir_all(&lib).unwrap();
    fs::write(lib.join("a.mp4"), b"x").unwrap();

    let cfg = Configuration {
        clip_library_path: lib.clone(),
        ..Configuration::default()
    };

    let (pool_tx, mut pool_rx) = mpsc::channel::<PoolEvent>(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(files::run(cfg, pool_tx, cancel.clone()));

    let initial = recv_pool(&mut pool_rx).await;
    assert_eq!(pool_keys(&initial), vec!["a.mp4"]);

    // give the watcher a moment to register before mutating the library
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(lib.join("b.mp4"), b"x").unwrap();

    let rescanned = recv_pool(&mut pool_rx).await;
    assert_eq!(pool_keys(&rescanned), vec!["a.mp4", "b.mp4"]);

    cancel.cancel();
    let _ = handle.await;
}
