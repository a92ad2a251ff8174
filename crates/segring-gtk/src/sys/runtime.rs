use crate::events::AppEvent;
use async_channel::Sender;
use segring::RingParameters;
use segring::config::{ConfigReloader, get_config_path};
use std::thread;
use tokio::runtime::Runtime;

/// Runs the config watcher on its own tokio runtime. `parameters` are the ring
/// parameters the store was built with.
pub fn start_background_services(tx: Sender<AppEvent>, parameters: RingParameters) {
    let path = match get_config_path() {
        Ok(path) => path,
        Err(e) => {
            log::error!("Config hot reload disabled: {}", e);
            return;
        }
    };
    let reloader = ConfigReloader::new(path, parameters);

    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(crate::sys::watcher::watch_config(reloader, tx));
    });
}
