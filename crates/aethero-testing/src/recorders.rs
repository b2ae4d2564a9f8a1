//! # Recording Collaborators
//!
//! Sinks and callbacks that keep every call for later assertions. Each type
//! is cheap to clone; clones share the same history, so a test can hand one
//! clone to the runtime and inspect another.

use aethero_core::{
    AgentId, CallbackError, CallbackResult, ErrorNotification, LogSink, LogStatus, LogUnit,
    NotificationCallback,
};
use aethero_mesh::{Message, MessageCallback};
use aethero_observability::{Alert, AlertCallback};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared call history plus an optional forced failure
#[derive(Debug)]
struct Recorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
    failing: Arc<AtomicBool>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            failing: Arc::clone(&self.failing),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<T: Clone> Recorder<T> {
    fn record(&self, item: T) -> CallbackResult {
        self.calls.lock().unwrap().push(item);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CallbackError::new("recording callback configured to fail"));
        }
        Ok(())
    }

    fn history(&self) -> Vec<T> {
        self.calls.lock().unwrap().clone()
    }

    fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Log sink that records every unit it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingLogSink {
    recorder: Recorder<LogUnit>,
}

impl RecordingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unit emitted so far, in order
    pub fn units(&self) -> Vec<LogUnit> {
        self.recorder.history()
    }

    /// Statuses of the emitted units, in order
    pub fn statuses(&self) -> Vec<LogStatus> {
        self.units().iter().map(|u| u.status).collect()
    }

    /// Units emitted for one agent
    pub fn units_for(&self, agent_id: &AgentId) -> Vec<LogUnit> {
        self.units()
            .into_iter()
            .filter(|u| &u.agent_id == agent_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recorder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        self.recorder.reset();
    }
}

impl LogSink for RecordingLogSink {
    fn emit(&self, unit: &LogUnit) {
        self.recorder.calls.lock().unwrap().push(unit.clone());
    }
}

/// Alert callback that records alerts, optionally failing after recording
#[derive(Debug, Clone, Default)]
pub struct RecordingAlerts {
    recorder: Recorder<Alert>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose callback returns an error after recording
    pub fn failing() -> Self {
        let alerts = Self::default();
        alerts.recorder.failing.store(true, Ordering::SeqCst);
        alerts
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.recorder.history()
    }

    /// Alert messages across all recorded alerts, flattened
    pub fn messages(&self) -> Vec<String> {
        self.alerts().into_iter().flat_map(|a| a.alerts).collect()
    }

    pub fn count(&self) -> usize {
        self.recorder.len()
    }

    pub fn reset(&self) {
        self.recorder.reset();
    }
}

#[async_trait]
impl AlertCallback for RecordingAlerts {
    async fn on_alert(&self, alert: &Alert) -> CallbackResult {
        self.recorder.record(alert.clone())
    }
}

/// Notification callback that records error notifications
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifications {
    recorder: Recorder<ErrorNotification>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifications = Self::default();
        notifications.recorder.failing.store(true, Ordering::SeqCst);
        notifications
    }

    pub fn notifications(&self) -> Vec<ErrorNotification> {
        self.recorder.history()
    }

    pub fn count(&self) -> usize {
        self.recorder.len()
    }

    pub fn reset(&self) {
        self.recorder.reset();
    }
}

#[async_trait]
impl NotificationCallback for RecordingNotifications {
    async fn notify(&self, notification: &ErrorNotification) -> CallbackResult {
        self.recorder.record(notification.clone())
    }
}

/// Bus subscriber callback that records delivered messages
#[derive(Debug, Clone, Default)]
pub struct RecordingMessages {
    recorder: Recorder<Message>,
}

impl RecordingMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let messages = Self::default();
        messages.recorder.failing.store(true, Ordering::SeqCst);
        messages
    }

    pub fn messages(&self) -> Vec<Message> {
        self.recorder.history()
    }

    pub fn count(&self) -> usize {
        self.recorder.len()
    }
}

#[async_trait]
impl MessageCallback for RecordingMessages {
    async fn on_message(&self, message: &Message) -> CallbackResult {
        self.recorder.record(message.clone())
    }
}
