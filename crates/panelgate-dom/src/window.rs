//! A simulated page window that records what the engine asked it to do.

use std::sync::Mutex;

use url::Url;

use panelgate_contracts::message::{Notice, OutboundMessage};
use panelgate_core::traits::{Location, PageWindow};

#[derive(Debug, Default)]
struct WindowLog {
    opened: Vec<String>,
    alerts: Vec<Notice>,
    posted: Vec<OutboundMessage>,
}

/// A [`PageWindow`] that keeps every side effect in memory.
pub struct SimulatedWindow {
    location: Mutex<Location>,
    log: Mutex<WindowLog>,
}

impl SimulatedWindow {
    pub fn new(href: Url) -> Self {
        Self {
            location: Mutex::new(Location::new(href)),
            log: Mutex::new(WindowLog::default()),
        }
    }

    pub fn navigate(&self, href: Url) {
        if let Ok(mut location) = self.location.lock() {
            *location = Location::new(href);
        }
    }

    /// URLs opened in new windows, oldest first.
    pub fn opened(&self) -> Vec<String> {
        self.log.lock().map(|l| l.opened.clone()).unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<Notice> {
        self.log.lock().map(|l| l.alerts.clone()).unwrap_or_default()
    }

    pub fn posted(&self) -> Vec<OutboundMessage> {
        self.log.lock().map(|l| l.posted.clone()).unwrap_or_default()
    }
}

impl PageWindow for SimulatedWindow {
    fn location(&self) -> Location {
        match self.location.lock() {
            Ok(location) => location.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn open(&self, url: &str) {
        if let Ok(mut log) = self.log.lock() {
            log.opened.push(url.to_string());
        }
    }

    fn alert(&self, notice: &Notice) {
        if let Ok(mut log) = self.log.lock() {
            log.alerts.push(notice.clone());
        }
    }

    fn post_message(&self, message: OutboundMessage) {
        if let Ok(mut log) = self.log.lock() {
            log.posted.push(message);
        }
    }
}
