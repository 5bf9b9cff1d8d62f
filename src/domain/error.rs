//! Domain error taxonomy.
use log::error;
use thiserror::Error;

/// Errors the domain layer surfaces to callers.
///
/// `UserNotFound` and `InvalidInput` carry enough detail for the boundary to
/// map them to a client-facing response. The three generic wrappers
/// deliberately hide internal detail; the underlying cause is logged, not
/// returned.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Balance calculation failed")]
    BalanceCalculationFailed,
    #[error("Projection calculation failed")]
    ProjectionFailed,
    #[error("Monthly reset failed")]
    ResetFailed,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Log an unexpected failure with context and replace it with the generic
/// wrapper. Errors that are already domain errors pass through unchanged.
pub(crate) fn wrap_unexpected(
    err: anyhow::Error,
    wrapper: DomainError,
    context: &str,
) -> anyhow::Error {
    if err.is::<DomainError>() {
        return err;
    }
    error!("{}: {:#}", context, err);
    anyhow::Error::from(wrapper)
}
