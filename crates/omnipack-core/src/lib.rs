mod cancel;
mod config;
mod log;
mod outcome;
mod settings;

pub use cancel::{CancelToken, Cancelled};
pub use config::{BatchConfig, ConfirmationRequest, TargetSet, ALL_PACKAGES_SENTINEL};
pub use log::{LogSink, RecordingSink, TracingSink};
pub use outcome::{MessageLevel, OutcomeMessage, OutcomeStatus, PackageOutcome};
pub use settings::{Settings, DEBUG_ENV_VAR};
