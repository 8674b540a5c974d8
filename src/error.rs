//! Error types for the TMI client.
//!
//! Only connection and handshake failures surface as errors. Parsing and
//! tag decoding recover locally, and send failures are logged.

use std::time::Duration;

use thiserror::Error;

/// Convenience type alias for Results using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned when establishing a session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// `connect` was called on a session that already has a socket.
    #[error("already connected")]
    AlreadyConnected,

    /// The TCP dial failed.
    #[error("failed to connect to {addr}: {source}")]
    Dial {
        /// The address that was dialed.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the token or nickname.
    #[error("invalid token")]
    InvalidToken,

    /// The server did not finish the handshake within the deadline.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// The peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// I/O error while reading.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by the credentials rather than the network.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::InvalidToken)
    }
}

/// Errors from [`Message::from_str`](crate::Message).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty.
    #[error("empty message")]
    EmptyMessage,
}

/// Errors from the Helix and OAuth clients.
#[cfg(feature = "api")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status returned by the server.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No bearer token could be obtained.
    #[error("generate token: {0}")]
    Token(#[source] Box<ApiError>),
}
