use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use segring::config::ConfigReloader;
use std::path::Path;

type WatchResult = notify::Result<Event>;

/// Watches the config file's directory and forwards ring parameter changes as
/// `AppEvent::ConfigReload`. Edits that leave the parameters unchanged send nothing.
pub async fn watch_config(mut reloader: ConfigReloader, tx: Sender<AppEvent>) {
    let Some(dir) = reloader.path().parent().map(Path::to_path_buf) else {
        log::error!("Config path {} has no parent", reloader.path().display());
        return;
    };

    // keep `_watcher` alive for as long as events are read
    let Some((_watcher, events)) = spawn_watcher(&dir) else {
        return;
    };
    log::debug!("Watching {}", reloader.path().display());

    while let Ok(res) = events.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::error!("Watch error: {}", e);
                continue;
            }
        };
        if !touches(&event, reloader.path()) {
            continue;
        }

        match reloader.reload() {
            Ok(Some(parameters)) => {
                log::info!("Ring parameters changed on disk");
                if tx.send(AppEvent::ConfigReload(parameters)).await.is_err() {
                    break;
                }
            }
            Ok(None) => log::debug!("Config touched, ring parameters unchanged"),
            Err(e) => log::error!("Failed to reload config: {}", e),
        }
    }
}

fn spawn_watcher(dir: &Path) -> Option<(RecommendedWatcher, Receiver<WatchResult>)> {
    // the file itself may not exist yet
    if let Err(e) = fs_err::create_dir_all(dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return None;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res: WatchResult| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )
    .inspect_err(|e| log::error!("Failed to create watcher: {}", e))
    .ok()?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .inspect_err(|e| log::error!("Failed to watch {}: {}", dir.display(), e))
        .ok()?;
    Some((watcher, bridge_rx))
}

fn touches(event: &Event, path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == path)
}
