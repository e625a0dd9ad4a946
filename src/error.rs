//! Error types for the swap orchestrator

use thiserror::Error;

/// Main error type for swap operations
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid amount: {0}")]
    Validation(String),

    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Transfer failed after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Status lookup error: {0}")]
    Status(String),
}

impl SwapError {
    /// Stable lowercase label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::Config(_) => "config",
            SwapError::Validation(_) => "validation",
            SwapError::WalletUnavailable(_) => "wallet_unavailable",
            SwapError::Transfer(_) => "transfer",
            SwapError::RetryExhausted { .. } => "retry_exhausted",
            SwapError::Persistence(_) => "persistence",
            SwapError::Status(_) => "status",
        }
    }

    /// Check if the caller may usefully retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwapError::WalletUnavailable(_)
                | SwapError::Transfer(_)
                | SwapError::RetryExhausted { .. }
                | SwapError::Status(_)
        )
    }
}

/// Result type for swap operations
pub type SwapResult<T> = Result<T, SwapError>;
