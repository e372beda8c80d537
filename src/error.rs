//! Unified error type.

use thiserror::Error;

/// The error type returned by seqlog's fallible operations.
///
/// Application-level errors (404, 400, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, and logging never fails from the
/// caller's point of view. This type only surfaces infrastructure failures:
/// parsing the bind address, binding to a port, or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The address passed to [`Server::bind`](crate::Server::bind) is not a
    /// valid `host:port` pair.
    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
