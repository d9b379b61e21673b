use std::sync::Mutex;

use crate::outcome::{MessageLevel, OutcomeMessage};

pub trait LogSink: Sync {
    fn log(&self, level: MessageLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(MessageLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(MessageLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(MessageLevel::Error, message);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Info => tracing::info!("{message}"),
            MessageLevel::Warn => tracing::warn!("{message}"),
            MessageLevel::Error => tracing::error!("{message}"),
        }
    }
}

// Captures everything it sees and optionally forwards to another sink.
// The orchestrator wraps one around the ambient sink per target so retry
// warnings end up in that target's outcome messages as well as the log.
pub struct RecordingSink<'a> {
    forward_to: Option<&'a dyn LogSink>,
    captured: Mutex<Vec<OutcomeMessage>>,
}

impl<'a> RecordingSink<'a> {
    pub fn new() -> Self {
        Self {
            forward_to: None,
            captured: Mutex::new(Vec::new()),
        }
    }

    pub fn forwarding(inner: &'a dyn LogSink) -> Self {
        Self {
            forward_to: Some(inner),
            captured: Mutex::new(Vec::new()),
        }
    }

    pub fn captured(&self) -> Vec<OutcomeMessage> {
        self.captured
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn into_captured(self) -> Vec<OutcomeMessage> {
        self.captured.into_inner().unwrap_or_default()
    }
}

impl Default for RecordingSink<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for RecordingSink<'_> {
    fn log(&self, level: MessageLevel, message: &str) {
        if let Some(inner) = self.forward_to {
            inner.log(level, message);
        }
        if let Ok(mut messages) = self.captured.lock() {
            messages.push(OutcomeMessage::new(level, message));
        }
    }
}
