//! Coordinator error types.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors internal to a coordinator operation.
///
/// These never cross the coordinator boundary: public operations convert
/// them into a failed outcome plus a notification.
#[derive(Debug, Error)]
pub enum OpError {
    /// failure from either remote store
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// operation invoked with missing required fields
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// operation aborted at the confirmation step
    #[error("cancelled by user")]
    Cancelled,
}

impl OpError {
    /// check if the user declined rather than something failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OpError::Cancelled)
    }
}

/// result type alias for coordinator internals
pub type OpResult<T> = Result<T, OpError>;
