//! Capabilities the presentation layer hands to the stores: a confirmation
//! prompt before destructive actions and a sink for user-facing notices.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

impl<F: FnMut(&str, Severity)> Notifier for F {
    fn notify(&mut self, message: &str, severity: Severity) {
        self(message, severity)
    }
}

/// Blocking yes/no prompt. Stores only call it once they know the action
/// would change something.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Routes notices to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Success | Severity::Info => info!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}

/// Keeps notices until the caller drains them.
#[derive(Debug, Default, Clone)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.entries.push(Notification { message: message.to_string(), severity });
    }
}
