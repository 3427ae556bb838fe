//! Mock transport with calls stubbed to return default values.
//!
//! Each call can be programmed with an outcome and records the requests it
//! was invoked with.
#![allow(clippy::new_without_default)]
use std::{cell::RefCell, fmt};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use google_cloud_rust_raw::bigtable::v2::bigtable::{
    CheckAndMutateRowRequest, CheckAndMutateRowResponse, MutateRowRequest, MutateRowResponse,
    MutateRowsRequest, MutateRowsResponse, ReadModifyWriteRowRequest, ReadModifyWriteRowResponse,
    ReadRowsRequest, ReadRowsResponse, SampleRowKeysRequest, SampleRowKeysResponse,
};

use crate::{
    error::{TransportError, TransportResult},
    transport::{CallOptions, Transport, TransportStream},
};

/// A stubbed unary call
pub struct MockUnary<Req, Resp> {
    outcome: RefCell<Option<TransportResult<Resp>>>,
    calls: RefCell<Vec<(Req, CallOptions)>>,
}

impl<Req, Resp> MockUnary<Req, Resp>
where
    Req: Clone,
    Resp: Clone + Default,
{
    pub fn new() -> Self {
        Self {
            outcome: RefCell::new(None),
            calls: RefCell::new(vec![]),
        }
    }

    /// Complete every subsequent call with `outcome`
    pub fn returns(&self, outcome: TransportResult<Resp>) {
        *self.outcome.borrow_mut() = Some(outcome);
    }

    pub fn calls(&self) -> Vec<(Req, CallOptions)> {
        self.calls.borrow().clone()
    }

    pub fn requests(&self) -> Vec<Req> {
        self.calls.borrow().iter().map(|(req, _)| req.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn invoke(&self, req: &Req, opt: CallOptions) -> TransportResult<Resp> {
        self.calls.borrow_mut().push((req.clone(), opt));
        self.outcome
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(Resp::default()))
    }
}

enum StreamOutcome<Resp> {
    /// The call starts and yields these
    Items(Vec<TransportResult<Resp>>),
    /// The call fails to start at all
    FailsToStart(TransportError),
}

/// A stubbed server streaming call
pub struct MockStreaming<Req, Resp> {
    outcome: RefCell<Option<StreamOutcome<Resp>>>,
    calls: RefCell<Vec<(Req, CallOptions)>>,
}

impl<Req, Resp> MockStreaming<Req, Resp>
where
    Req: Clone,
    Resp: Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            outcome: RefCell::new(None),
            calls: RefCell::new(vec![]),
        }
    }

    /// Yield `items` from every subsequent call
    pub fn emits(&self, items: Vec<Resp>) {
        self.yields(items.into_iter().map(Ok).collect());
    }

    /// Yield `items`, which may include errors, from every subsequent call
    pub fn yields(&self, items: Vec<TransportResult<Resp>>) {
        *self.outcome.borrow_mut() = Some(StreamOutcome::Items(items));
    }

    /// Fail every subsequent call mid-stream, before yielding a response
    pub fn fails(&self, err: TransportError) {
        self.yields(vec![Err(err)]);
    }

    /// Fail every subsequent call before its stream is even returned
    pub fn fails_to_start(&self, err: TransportError) {
        *self.outcome.borrow_mut() = Some(StreamOutcome::FailsToStart(err));
    }

    pub fn calls(&self) -> Vec<(Req, CallOptions)> {
        self.calls.borrow().clone()
    }

    pub fn requests(&self) -> Vec<Req> {
        self.calls.borrow().iter().map(|(req, _)| req.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn invoke(&self, req: &Req, opt: CallOptions) -> TransportResult<TransportStream<Resp>> {
        self.calls.borrow_mut().push((req.clone(), opt));
        let items = match &*self.outcome.borrow() {
            None => vec![],
            Some(StreamOutcome::Items(items)) => items.clone(),
            Some(StreamOutcome::FailsToStart(err)) => return Err(err.clone()),
        };
        Ok(stream::iter(items).boxed_local())
    }
}

macro_rules! impl_debug {
    ($($mock:ident),+) => {
        $(
            impl<Req, Resp> fmt::Debug for $mock<Req, Resp> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($mock))
                        .field("calls", &self.calls.borrow().len())
                        .finish()
                }
            }
        )+
    };
}

impl_debug!(MockUnary, MockStreaming);

#[derive(Debug)]
pub struct MockTransport {
    pub read_rows: MockStreaming<ReadRowsRequest, ReadRowsResponse>,
    pub sample_row_keys: MockStreaming<SampleRowKeysRequest, SampleRowKeysResponse>,
    pub mutate_rows: MockStreaming<MutateRowsRequest, MutateRowsResponse>,
    pub mutate_row: MockUnary<MutateRowRequest, MutateRowResponse>,
    pub check_and_mutate_row: MockUnary<CheckAndMutateRowRequest, CheckAndMutateRowResponse>,
    pub read_modify_write_row: MockUnary<ReadModifyWriteRowRequest, ReadModifyWriteRowResponse>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            read_rows: MockStreaming::new(),
            sample_row_keys: MockStreaming::new(),
            mutate_rows: MockStreaming::new(),
            mutate_row: MockUnary::new(),
            check_and_mutate_row: MockUnary::new(),
            read_modify_write_row: MockUnary::new(),
        }
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    fn read_rows(
        &self,
        req: &ReadRowsRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<ReadRowsResponse>> {
        self.read_rows.invoke(req, opt)
    }

    fn sample_row_keys(
        &self,
        req: &SampleRowKeysRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<SampleRowKeysResponse>> {
        self.sample_row_keys.invoke(req, opt)
    }

    fn mutate_rows(
        &self,
        req: &MutateRowsRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<MutateRowsResponse>> {
        self.mutate_rows.invoke(req, opt)
    }

    async fn mutate_row(
        &self,
        req: &MutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<MutateRowResponse> {
        self.mutate_row.invoke(req, opt)
    }

    async fn check_and_mutate_row(
        &self,
        req: &CheckAndMutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<CheckAndMutateRowResponse> {
        self.check_and_mutate_row.invoke(req, opt)
    }

    async fn read_modify_write_row(
        &self,
        req: &ReadModifyWriteRowRequest,
        opt: CallOptions,
    ) -> TransportResult<ReadModifyWriteRowResponse> {
        self.read_modify_write_row.invoke(req, opt)
    }
}
