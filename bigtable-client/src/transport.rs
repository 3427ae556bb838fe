//! The seam between [crate::BigtableClient] and the network.
use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use futures::stream::LocalBoxStream;
use google_cloud_rust_raw::bigtable::v2::bigtable::{
    CheckAndMutateRowRequest, CheckAndMutateRowResponse, MutateRowRequest, MutateRowResponse,
    MutateRowsRequest, MutateRowsResponse, ReadModifyWriteRowRequest, ReadModifyWriteRowResponse,
    ReadRowsRequest, ReadRowsResponse, SampleRowKeysRequest, SampleRowKeysResponse,
};

use crate::{error::TransportResult, method::Method};

/// The responses of a server streaming call, as produced by a [Transport]
pub type TransportStream<T> = LocalBoxStream<'static, TransportResult<T>>;

/// Per call options handed to the [Transport] alongside the request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// The call's deadline
    pub timeout: Option<Duration>,
    /// Additional metadata headers
    pub headers: Vec<(String, String)>,
}

impl CallOptions {
    /// Options carrying the [Method::default_timeout]
    pub fn for_method(method: Method) -> Self {
        Self {
            timeout: Some(method.default_timeout()),
            ..Default::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Performs the actual RPCs of the Bigtable service.
///
/// Streaming calls return their response stream (or fail to start)
/// synchronously, unary calls complete asynchronously. Implementations
/// never see a request the caller didn't build: they must treat it as
/// read-only.
#[async_trait(?Send)]
pub trait Transport: Debug {
    fn read_rows(
        &self,
        req: &ReadRowsRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<ReadRowsResponse>>;

    fn sample_row_keys(
        &self,
        req: &SampleRowKeysRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<SampleRowKeysResponse>>;

    fn mutate_rows(
        &self,
        req: &MutateRowsRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<MutateRowsResponse>>;

    async fn mutate_row(
        &self,
        req: &MutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<MutateRowResponse>;

    async fn check_and_mutate_row(
        &self,
        req: &CheckAndMutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<CheckAndMutateRowResponse>;

    async fn read_modify_write_row(
        &self,
        req: &ReadModifyWriteRowRequest,
        opt: CallOptions,
    ) -> TransportResult<ReadModifyWriteRowResponse>;
}
