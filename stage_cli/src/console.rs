//! Terminal renditions of the notification and navigation boundaries.

use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use stage_core::{Navigator, Notification, Notifier, Severity};
use tracing::debug;

/// Prints toasts to stderr, pausing the busy spinner while it does.
pub struct TerminalNotifier {
    spinner: ProgressBar,
}

impl TerminalNotifier {
    pub fn new(spinner: ProgressBar) -> Self {
        Self { spinner }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, n: Notification) {
        let title = match n.severity {
            Severity::Success => n.title.green().bold().to_string(),
            Severity::Danger => n.title.red().bold().to_string(),
            Severity::Warning => n.title.yellow().bold().to_string(),
            Severity::Info => n.title.cyan().bold().to_string(),
        };
        self.spinner.suspend(|| eprintln!("{}: {}", title, n.body));
    }
}

/// There is no router in a terminal; the destination path is only logged.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn go_to(&self, path: &str) {
        debug!(path, "returning to list view");
    }
}
