//! Error taxonomy surfaced by the connection manager
//!
//! Every variant renders a one-line human-readable description; the
//! connection record keeps the latest error string separately from the
//! connection phase so a UI can show "offline, last error: ...".

use crate::profile::StoreError;
use crate::transport::TransportError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No host profile with the given id
    #[error("no host profile with id {0}")]
    HostUnknown(Uuid),

    /// The operation requires a live Connected state
    #[error("connection is not established")]
    NotConnected,

    /// Failure in the SSH layer during open or I/O
    #[error("transport error: {0}")]
    Transport(String),

    /// The credential was rejected by the remote
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Referenced credential id is missing from the key store, or the blob
    /// is not a usable private key
    #[error("referenced credential is not available")]
    KeyUnavailable,

    /// Handshake or read exceeded its bound
    #[error("operation timed out")]
    Timeout,

    /// `%exit` received, or the transport closed while Connected
    #[error("remote tmux exited: {0}")]
    RemoteExit(String),

    /// A control line outgrew the framer cap; fatal for the connection
    #[error("control line exceeded the frame limit")]
    OverlongFrame,

    /// Profile or credential storage failure
    #[error("storage error: {0}")]
    Store(String),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Auth(detail) => ClientError::Auth(detail),
            TransportError::Timeout => ClientError::Timeout,
            other => ClientError::Transport(other.to_string()),
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        ClientError::Store(err.to_string())
    }
}
