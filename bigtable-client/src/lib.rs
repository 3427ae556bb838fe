//! Forwarding client for the Cloud Bigtable data API (`google.bigtable.v2`).
#[macro_use]
extern crate slog_scope;

mod client;
mod error;
mod grpc;
mod metadata;
mod method;
pub mod logging;
pub mod mock;
pub mod path;
mod stream;
mod transport;

#[cfg(test)]
mod test;

pub use client::BigtableClient;
pub use error::{ClientError, ClientErrorKind, TransportError, TransportResult};
pub use google_cloud_rust_raw::bigtable::v2::{bigtable, data};
pub use grpc::GrpcTransport;
pub use method::{CallKind, Method};
pub use stream::{ResponseStream, StreamState};
pub use transport::{CallOptions, Transport, TransportStream};
