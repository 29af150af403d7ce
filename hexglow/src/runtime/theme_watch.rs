use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use super::events::{RuntimeCommand, RuntimeCommandSender};
use crate::theme::Theme;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Remembers the last OS theme seen so only real changes are reported
#[derive(Clone, Copy, Debug, Default)]
pub struct ThemeTracker {
    last: Option<Theme>,
}

impl ThemeTracker {
    pub fn new(initial: Option<Theme>) -> Self {
        Self { last: initial }
    }

    pub fn observe(&mut self, theme: Theme) -> Option<Theme> {
        if self.last == Some(theme) {
            return None;
        }
        self.last = Some(theme);
        Some(theme)
    }
}

pub fn detect_system_theme() -> Theme {
    Theme::from(dark_light::detect())
}

/// Polls the operating system theme on a background thread and sends
/// [`RuntimeCommand::SetTheme`] when it flips. Stops when dropped.
pub struct ThemeWatch {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThemeWatch {
    pub fn start(
        initial: Theme,
        interval: Duration,
        command_tx: RuntimeCommandSender,
    ) -> Option<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let spawned = thread::Builder::new()
            .name("hexglow-theme".to_string())
            .spawn(move || {
                let mut tracker = ThemeTracker::new(Some(initial));
                while !stop_flag.load(Ordering::SeqCst) {
                    thread::park_timeout(interval);
                    if stop_flag.load(Ordering::SeqCst) {
                        break;
                    }
                    let Some(theme) = tracker.observe(detect_system_theme())
                    else {
                        continue;
                    };
                    info!("system theme changed to {}", theme);
                    if command_tx.send(RuntimeCommand::SetTheme(theme)).is_err()
                    {
                        break;
                    }
                }
                debug!("theme watcher stopped");
            });

        match spawned {
            Ok(handle) => Some(Self {
                stop,
                handle: Some(handle),
            }),
            Err(err) => {
                warn!("system theme watching unavailable: {}", err);
                None
            }
        }
    }
}

impl Drop for ThemeWatch {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}
