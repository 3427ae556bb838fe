use std::{error::Error as _, fmt};

use backtrace::Backtrace;
use bigtable_common::{from_error, impl_fmt_display, ReportableError};
use grpcio::RpcStatusCode;
use thiserror::Error;

use crate::path::PathError;

/// A failure reported by a [crate::Transport].
///
/// Only transports construct these: the client relays them to callers
/// as-is.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("RPC failed with status {code:?}: {message}")]
pub struct TransportError {
    code: RpcStatusCode,
    message: String,
}

impl TransportError {
    pub fn new<C: Into<RpcStatusCode>>(code: C, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The gRPC status code of the failed call
    pub fn code(&self) -> RpcStatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<grpcio::Error> for TransportError {
    fn from(inner: grpcio::Error) -> Self {
        match inner {
            grpcio::Error::RpcFailure(ref status) | grpcio::Error::RpcFinished(Some(ref status)) => {
                Self::new(status.code(), status.message())
            }
            _ => Self::new(RpcStatusCode::UNKNOWN, inner.to_string()),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while setting up a client (configuration, channels,
/// logging), as opposed to the [TransportError]s relayed from calls.
#[derive(Debug)]
pub struct ClientError {
    kind: ClientErrorKind,
    pub backtrace: Backtrace,
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        ClientErrorKind::Config(msg.into()).into()
    }

    pub fn logging(msg: impl Into<String>) -> Self {
        ClientErrorKind::Logging(msg.into()).into()
    }

    pub fn kind(&self) -> &ClientErrorKind {
        &self.kind
    }
}

#[derive(Debug, Error)]
pub enum ClientErrorKind {
    #[error("Invalid configuration: {}", _0)]
    Config(String),

    #[error("Configuration error: {}", _0)]
    Settings(#[from] config::ConfigError),

    #[error("{}", _0)]
    ResourceName(#[from] PathError),

    #[error("A gRPC error occurred: {}", _0)]
    Grpc(#[from] grpcio::Error),

    #[error("{}", _0)]
    Transport(#[from] TransportError),

    #[error("Logging error: {}", _0)]
    Logging(String),
}

impl From<ClientErrorKind> for ClientError {
    fn from(kind: ClientErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::new(),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl ReportableError for ClientError {
    fn backtrace(&self) -> Option<&Backtrace> {
        Some(&self.backtrace)
    }

    fn error_label(&self) -> Option<&str> {
        Some(match self.kind {
            ClientErrorKind::Config(_) | ClientErrorKind::Settings(_) => "config",
            ClientErrorKind::ResourceName(_) => "resource_name",
            ClientErrorKind::Grpc(_) => "grpc",
            ClientErrorKind::Transport(_) => "transport",
            ClientErrorKind::Logging(_) => "logging",
        })
    }
}

impl_fmt_display!(ClientError, ClientErrorKind);

from_error!(config::ConfigError, ClientError, ClientErrorKind::Settings);
from_error!(PathError, ClientError, ClientErrorKind::ResourceName);
from_error!(grpcio::Error, ClientError, ClientErrorKind::Grpc);
from_error!(TransportError, ClientError, ClientErrorKind::Transport);
