//! Completion notification with best-effort fallbacks

use std::{
    fmt,
    path::Path,
    process::Stdio,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::ValueEnum;
use notify_rust::Notification;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{
    error::NotifyError,
    state::{AlertKind, UiState},
};

pub const COMPLETION_SUMMARY: &str = "Pomodoro finished ⏰";
pub const COMPLETION_BODY: &str = "Take a five minute break 🌿";
pub const TITLE_FLASH: &str = "⏰ Pomodoro finished!";
const TITLE_FLASH_DURATION: Duration = Duration::from_secs(5);

const SOUND_CANDIDATES: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// System notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

/// System notification facility
pub trait NotificationBackend: Send + Sync {
    fn permission(&self) -> Permission;
    /// Ask for permission; only meaningful while it is `Default`
    fn request_permission(&self) -> Permission;
    fn show(&self, summary: &str, body: &str) -> Result<(), NotifyError>;
}

/// A step run when the system notification could not be delivered
pub trait Fallback: Send + Sync {
    fn name(&self) -> &'static str;
    fn trigger(&self, summary: &str, body: &str) -> Result<(), NotifyError>;
}

/// Desktop notifications through notify-rust
#[derive(Debug)]
pub struct DesktopNotifications {
    permission: Mutex<Permission>,
}

impl DesktopNotifications {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
        }
    }

    fn set_permission(&self, permission: Permission) {
        if let Ok(mut current) = self.permission.lock() {
            *current = permission;
        }
    }
}

impl NotificationBackend for DesktopNotifications {
    fn permission(&self) -> Permission {
        self.permission.lock().map(|p| *p).unwrap_or(Permission::Denied)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn request_permission(&self) -> Permission {
        // No prompt on the desktop; a reachable notification server counts as consent
        let granted = match notify_rust::get_server_information() {
            Ok(info) => {
                debug!("Notification server: {} {}", info.name, info.version);
                Permission::Granted
            }
            Err(e) => {
                warn!("No notification server available: {}", e);
                Permission::Denied
            }
        };
        self.set_permission(granted);
        granted
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn request_permission(&self) -> Permission {
        self.set_permission(Permission::Granted);
        Permission::Granted
    }

    fn show(&self, summary: &str, body: &str) -> Result<(), NotifyError> {
        Notification::new()
            .summary(summary)
            .body(body)
            .appname("pomodoro-player")
            .icon("alarm-clock")
            .timeout(0)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Backend(e.to_string()))
    }
}

/// Blocking alert shown in the page
pub struct AlertFallback {
    ui: Arc<UiState>,
}

impl AlertFallback {
    pub fn new(ui: Arc<UiState>) -> Self {
        Self { ui }
    }
}

impl Fallback for AlertFallback {
    fn name(&self) -> &'static str {
        "alert"
    }

    fn trigger(&self, summary: &str, body: &str) -> Result<(), NotifyError> {
        self.ui
            .raise_alert(AlertKind::Completion, format!("{}\n{}", summary, body))
            .map_err(|e| NotifyError::Backend(e.to_string()))
    }
}

/// Audible cue through the first available system sound
pub struct SoundFallback;

impl Fallback for SoundFallback {
    fn name(&self) -> &'static str {
        "sound"
    }

    fn trigger(&self, _summary: &str, _body: &str) -> Result<(), NotifyError> {
        let (player, file) = SOUND_CANDIDATES
            .iter()
            .find(|(_, file)| Path::new(file).exists())
            .ok_or(NotifyError::Unsupported("audible cue"))?;

        Command::new(player)
            .arg(file)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()?;
        debug!("Playing {} with {}", file, player);
        Ok(())
    }
}

/// Visual attention cue alternating the page title
pub struct TitleFallback {
    ui: Arc<UiState>,
}

impl TitleFallback {
    pub fn new(ui: Arc<UiState>) -> Self {
        Self { ui }
    }
}

impl Fallback for TitleFallback {
    fn name(&self) -> &'static str {
        "title"
    }

    fn trigger(&self, _summary: &str, _body: &str) -> Result<(), NotifyError> {
        self.ui.flash_title(TITLE_FLASH, TITLE_FLASH_DURATION)
    }
}

/// Haptic pulse; desktops have no vibration motor
pub struct HapticPulse;

impl Fallback for HapticPulse {
    fn name(&self) -> &'static str {
        "haptic"
    }

    fn trigger(&self, _summary: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported("haptic feedback"))
    }
}

/// What happened during one notification attempt
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotifyReport {
    pub delivered: bool,
    pub fired: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

pub struct Notifier {
    backend: Arc<dyn NotificationBackend>,
    fallbacks: Vec<Box<dyn Fallback>>,
    haptic: Box<dyn Fallback>,
}

impl Notifier {
    pub fn new(
        backend: Arc<dyn NotificationBackend>,
        fallbacks: Vec<Box<dyn Fallback>>,
        haptic: Box<dyn Fallback>,
    ) -> Self {
        Self {
            backend,
            fallbacks,
            haptic,
        }
    }

    /// Page alert, optional sound and title flashing behind the given backend
    pub fn standard(backend: Arc<dyn NotificationBackend>, ui: Arc<UiState>, sound: bool) -> Self {
        let mut fallbacks: Vec<Box<dyn Fallback>> = vec![Box::new(AlertFallback::new(Arc::clone(&ui)))];
        if sound {
            fallbacks.push(Box::new(SoundFallback));
        }
        fallbacks.push(Box::new(TitleFallback::new(ui)));
        Self::new(backend, fallbacks, Box::new(HapticPulse))
    }

    pub fn permission(&self) -> Permission {
        self.backend.permission()
    }

    /// Tell the user the countdown finished. Never fails; every step is independent.
    pub fn notify(&self, summary: &str, body: &str) -> NotifyReport {
        let mut report = NotifyReport::default();

        let permission = match self.backend.permission() {
            Permission::Default => {
                debug!("Notification permission undetermined, requesting it");
                self.backend.request_permission()
            }
            other => other,
        };
        if permission == Permission::Granted {
            match self.backend.show(summary, body) {
                Ok(()) => report.delivered = true,
                Err(e) => warn!("System notification failed: {}", e),
            }
        }

        if !report.delivered {
            for fallback in &self.fallbacks {
                match fallback.trigger(summary, body) {
                    Ok(()) => report.fired.push(fallback.name()),
                    Err(e) => {
                        warn!("Notification fallback '{}' failed: {}", fallback.name(), e);
                        report.failed.push(fallback.name());
                    }
                }
            }
        }

        match self.haptic.trigger(summary, body) {
            Ok(()) => report.fired.push(self.haptic.name()),
            Err(e) => debug!("Skipping {}: {}", self.haptic.name(), e),
        }

        info!(
            "Completion notification: delivered={}, fallbacks={:?}",
            report.delivered, report.fired
        );
        report
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("permission", &self.backend.permission())
            .field(
                "fallbacks",
                &self.fallbacks.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: &'static str,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Fallback for Counting {
        fn name(&self) -> &'static str {
            self.name
        }

        fn trigger(&self, _summary: &str, _body: &str) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::Backend("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn counting(name: &'static str, fail: bool) -> (Box<dyn Fallback>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Counting {
                name,
                fail,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    fn notifier(backend: Arc<FakeBackend>, first_fails: bool) -> (Notifier, Vec<Arc<AtomicUsize>>) {
        let (a, a_calls) = counting("alert", first_fails);
        let (b, b_calls) = counting("sound", false);
        let (c, c_calls) = counting("title", false);
        let (h, h_calls) = counting("haptic", false);
        (
            Notifier::new(backend, vec![a, b, c], h),
            vec![a_calls, b_calls, c_calls, h_calls],
        )
    }

    #[test]
    fn granted_permission_skips_fallbacks() {
        let backend = FakeBackend::new(Permission::Granted);
        let (notifier, calls) = notifier(Arc::clone(&backend), false);
        let report = notifier.notify(COMPLETION_SUMMARY, COMPLETION_BODY);
        assert!(report.delivered);
        assert_eq!(report.fired, vec!["haptic"]);
        assert_eq!(*backend.shown.lock().unwrap(), vec![COMPLETION_SUMMARY]);
        assert_eq!(calls[0].load(Ordering::SeqCst), 0);
        assert_eq!(calls[3].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_permission_is_requested_first() {
        let backend = FakeBackend::scripted(Permission::Default, Permission::Granted, false);
        let (notifier, _) = notifier(Arc::clone(&backend), false);
        let report = notifier.notify("s", "b");
        assert!(report.delivered);
        assert_eq!(*backend.requests.lock().unwrap(), 1);
        assert_eq!(notifier.permission(), Permission::Granted);
    }

    #[test]
    fn denied_permission_runs_every_fallback_despite_failures() {
        let backend = FakeBackend::new(Permission::Denied);
        let (notifier, calls) = notifier(Arc::clone(&backend), true);
        let report = notifier.notify("s", "b");
        assert!(!report.delivered);
        assert_eq!(report.failed, vec!["alert"]);
        assert_eq!(report.fired, vec!["sound", "title", "haptic"]);
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
        assert_eq!(*backend.requests.lock().unwrap(), 0);
    }

    #[test]
    fn failed_show_falls_back() {
        let backend = FakeBackend::scripted(Permission::Granted, Permission::Granted, true);
        let (notifier, calls) = notifier(backend, false);
        let report = notifier.notify("s", "b");
        assert!(!report.delivered);
        assert_eq!(calls[0].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn alert_fallback_raises_completion_alert() {
        let ui = Arc::new(UiState::new());
        let notifier = Notifier::new(
            FakeBackend::scripted(Permission::Default, Permission::Denied, false),
            vec![Box::new(AlertFallback::new(Arc::clone(&ui)))],
            Box::new(HapticPulse),
        );
        let report = notifier.notify(COMPLETION_SUMMARY, COMPLETION_BODY);
        assert_eq!(report.fired, vec!["alert"]);
        let alerts = ui.alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Completion);
        assert!(alerts[0].message.starts_with(COMPLETION_SUMMARY));
    }
}
