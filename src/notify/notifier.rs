use anyhow::Result;
use log::info;
use std::io::Write;

#[cfg(all(unix, not(target_os = "macos")))]
use std::collections::HashMap;

use crate::config::settings::NotifyBackend;

/// A user-visible notification. Showing one with a tag that is already on
/// screen replaces it rather than stacking a second copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub renotify: bool,
}

impl Notification {
    pub fn for_prayer(prayer: &str, body: &str) -> Self {
        Self {
            title: prayer.to_string(),
            body: body.to_string(),
            tag: prayer.to_string(),
            renotify: true,
        }
    }
}

pub trait Notifier {
    /// False when this surface cannot show anything; notification controls
    /// are then disabled.
    fn is_supported(&self) -> bool;

    fn show(&mut self, notification: &Notification) -> Result<()>;
}

pub fn from_backend(backend: NotifyBackend) -> Box<dyn Notifier + Send> {
    match backend {
        NotifyBackend::Desktop => Box::new(DesktopNotifier::default()),
        NotifyBackend::Terminal => Box::new(TerminalNotifier),
        NotifyBackend::None => Box::new(Unsupported),
    }
}

/// Whether a backend can show notifications, without building one.
pub fn backend_supported(backend: NotifyBackend) -> bool {
    backend != NotifyBackend::None
}

// ─── Desktop ─────────────────────────────────────────────────────────────────

/// Native desktop notifications
#[derive(Debug, Default)]
pub struct DesktopNotifier {
    /// Server-side ids of notifications we've shown, by tag
    #[cfg(all(unix, not(target_os = "macos")))]
    shown: HashMap<String, u32>,
}

impl Notifier for DesktopNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn show(&mut self, notification: &Notification) -> Result<()> {
        let mut native = notify_rust::Notification::new();
        native
            .summary(&notification.title)
            .body(&notification.body)
            .appname("namazkar");

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            if notification.renotify {
                if let Some(id) = self.shown.get(&notification.tag) {
                    native.id(*id);
                }
            }
            let handle = native.show()?;
            self.shown.insert(notification.tag.clone(), handle.id());
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            native.show()?;
        }

        info!("Notified: {}", notification.title);
        Ok(())
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Rings the bell and prints a line on stderr
#[derive(Debug)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn show(&mut self, notification: &Notification) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(
            stderr,
            "\x07[{}] {} — {}",
            chrono::Local::now().format("%H:%M:%S"),
            notification.title,
            notification.body
        )?;
        Ok(())
    }
}

// ─── Unsupported ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Unsupported;

impl Notifier for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    fn show(&mut self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}
