//! User-facing notifications
//!
//! Notifications are identified by title/message keys; turning keys into
//! localized text and showing a dialog is up to the [`Notifier`].

use tracing::{info, warn};

/// Alerts raised by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The chosen game needs a root folder; a directory pick follows
    SelectFolderRequest,
    /// The picked folder does not contain the game
    SelectFolderInvalid,
    /// The core refused the game or failed to start
    GameLoadingFailed,
    /// The core faulted while the game was running
    GameRunningFailed,
    /// The system's dependency files are missing
    SystemUnmetDependencies,
}

impl Notification {
    pub fn title_key(&self) -> &'static str {
        match self {
            Notification::SelectFolderRequest => "alert.select_folder_request.title",
            Notification::SelectFolderInvalid => "alert.select_folder_invalid.title",
            Notification::GameLoadingFailed => "alert.game_loading_failed.title",
            Notification::GameRunningFailed => "alert.game_running_failed.title",
            Notification::SystemUnmetDependencies => "alert.system_unmet_dependencies.title",
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            Notification::SelectFolderRequest => "alert.select_folder_request.message",
            Notification::SelectFolderInvalid => "alert.select_folder_invalid.message",
            Notification::GameLoadingFailed => "alert.game_loading_failed.message",
            Notification::GameRunningFailed => "alert.game_running_failed.message",
            Notification::SystemUnmetDependencies => "alert.system_unmet_dependencies.message",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notification::SelectFolderRequest)
    }
}

/// Notification capability.
///
/// Fire-and-forget: implementations return immediately and show the
/// dialog on their own schedule.
pub trait Notifier: Send + Sync {
    fn notify(&self, title_key: &str, message_key: &str);
}

/// Notifier writing alerts to the log, for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title_key: &str, message_key: &str) {
        info!(title = title_key, message = message_key, "notification");
    }
}

pub(crate) fn send(notifier: &dyn Notifier, notification: Notification) {
    if notification.is_error() {
        warn!("Alerting user: {:?}", notification);
    }
    notifier.notify(notification.title_key(), notification.message_key());
}
