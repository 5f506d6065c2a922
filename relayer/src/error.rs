//! The relayer's error type.
//!
//! Every fallible path in this crate returns [`Error`]. Reconcile ticks and
//! event-handler callbacks catch and log these; no error escapes a tick (see
//! the crate-level error handling design).

/// The error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `fundingTxHash` was not exactly 64 hex characters.
    #[error("invalid funding tx hash: expected 64 hex chars, got {0}")]
    InvalidFundingHash(usize),

    /// No deposit record exists for the given id.
    #[error("no deposit record for id {0}")]
    MissingRecord(String),

    /// The on-chain status returned by `deposits(id)` did not map to a
    /// known [`crate::model::DepositStatus`].
    #[error("unmappable on-chain deposit status: {0}")]
    UnmappableStatus(u64),

    /// The deposit store could not read or write a record.
    #[error("deposit store I/O error: {0}")]
    StoreIo(#[from] std::io::Error),

    /// A persisted record failed to parse as JSON.
    #[error("corrupt deposit record at {path}: {source}")]
    StoreCorrupt {
        /// Path of the offending file.
        path: std::path::PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Record (de)serialization failed outside of store corruption
    /// detection (e.g. encoding a record before a first write).
    #[error("deposit record (de)serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A transient RPC failure (timeout, connection reset, HTTP error).
    /// Logged, not persisted as `error`; retried next tick.
    #[error("transient RPC error: {0}")]
    RpcTransient(String),

    /// The pre-flight simulated call reverted.
    #[error("pre-flight reverted: {0}")]
    PreflightReverted(String),

    /// The transaction was sent but mined with a revert.
    #[error("transaction reverted on-chain: {0}")]
    SendReverted(String),

    /// An unknown or unconfigured chain type was requested.
    #[error("unknown chain type: {0}")]
    UnknownChainType(String),

    /// Startup configuration is invalid or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wraps an underlying alloy provider/transport failure.
    #[error("provider error: {0}")]
    Provider(#[from] alloy::transports::TransportError),

    /// Wraps an underlying alloy contract-call error (reverts land here
    /// before we classify them into `PreflightReverted`/`SendReverted`).
    #[error("contract error: {0}")]
    Contract(#[from] alloy::contract::Error),

    /// A handler or reconciler referenced a deposit id it could not parse
    /// into a `U256`.
    #[error("malformed deposit id: {0}")]
    MalformedId(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
