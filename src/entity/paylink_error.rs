/// EIP-1193 code returned when the user declines a wallet prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 code returned when `wallet_switchEthereumChain` targets an unknown chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

#[derive(Debug, thiserror::Error)]
pub enum PayLinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wallet provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("User rejected the request")]
    UserRejected,

    #[error("Unrecognized chain: {0}")]
    UnrecognizedChain(String),

    #[error("No wallet connected")]
    WalletNotConnected,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientFunds,

    #[error("Insufficient reward balance")]
    InsufficientRewardBalance,

    #[error("{0}")]
    Validation(String),

    #[error("Split bill not found: {0}")]
    SplitBillNotFound(String),

    #[error("No password set for this wallet")]
    PasswordNotSet,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Password is incorrect")]
    IncorrectPassword,

    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),
}

impl PayLinkError {
    /// Maps an EIP-1193 / JSON-RPC error object onto a domain error.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_CODE => PayLinkError::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => PayLinkError::UnrecognizedChain(message),
            _ => PayLinkError::Provider { code, message },
        }
    }
}
