use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl OutcomeMessage {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Upgraded,
    Installed,
    Skipped,
    Failed,
    Cancelled,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upgraded => "upgraded",
            Self::Installed => "installed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

// One record per package per batch run. Cancelled is deliberately not
// folded into Failed so callers can tell an aborted run from a broken one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageOutcome {
    pub identifier: String,
    pub version: String,
    pub status: OutcomeStatus,
    pub messages: Vec<OutcomeMessage>,
}

impl PackageOutcome {
    pub fn new(identifier: impl Into<String>, version: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
            status,
            messages: Vec::new(),
        }
    }

    pub fn upgraded(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(identifier, version, OutcomeStatus::Upgraded)
    }

    pub fn installed(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(identifier, version, OutcomeStatus::Installed)
    }

    pub fn skipped(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(identifier, version, OutcomeStatus::Skipped)
    }

    pub fn failed(
        identifier: impl Into<String>,
        version: impl Into<String>,
        error_text: impl Into<String>,
    ) -> Self {
        let mut outcome = Self::new(identifier, version, OutcomeStatus::Failed);
        outcome.push_message(MessageLevel::Error, error_text);
        outcome
    }

    pub fn cancelled(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        let mut outcome = Self::new(identifier, version, OutcomeStatus::Cancelled);
        outcome.push_message(MessageLevel::Warn, "operation cancelled before completion");
        outcome
    }

    pub fn success(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Upgraded | OutcomeStatus::Installed | OutcomeStatus::Skipped
        )
    }

    pub fn push_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.messages.push(OutcomeMessage::new(level, text));
    }

    pub fn with_message(mut self, level: MessageLevel, text: impl Into<String>) -> Self {
        self.push_message(level, text);
        self
    }
}
