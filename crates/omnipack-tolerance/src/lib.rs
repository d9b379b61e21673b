mod retry;

pub use retry::{retry, retry_unit, try_with_logging, OnFailure, RetryPolicy};
