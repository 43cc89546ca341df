//! Terminal error types.

use crate::book::OrderRejection;

/// Terminal error type.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("order rejected: {0}")]
    Rejected(#[from] OrderRejection),
    #[error("terminal is not running")]
    Stopped,
}
