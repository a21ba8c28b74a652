use std::net::SocketAddrV4;
use thiserror::Error;
use crate::tcp::state::TcpState;
use crate::tcp::tcp_flags::TcpFlags;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TcpError {
    #[error("Endpoint {addr} is already bound to another connection")]
    BindingConflict { addr: SocketAddrV4 }, // EADDRINUSE

    #[error("Unexpected {flags:?} in state {state}")]
    ProtocolViolation { state: TcpState, flags: TcpFlags },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid state: {0}")]
    InvalidState(String), // EINVAL

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Socket is not connected")]
    NotConnected, // ENOTCONN

    #[error("Connection timeout")]
    ConnectionTimeout, // ETIMEDOUT

    #[error("Connection reset")]
    ConnectionReset, // ECONNRESET

    #[error("Connection aborted")]
    ConnectionAborted, // ECONNABORTED

    #[error("Operation cancelled")]
    Cancelled, // ECANCELED

    #[error("Address not available")]
    AddressNotAvailable, // EADDRNOTAVAIL
}
