use std::{sync::Arc, time::Duration};

use bigtable_settings::Settings;
use google_cloud_rust_raw::bigtable::v2::bigtable::{
    CheckAndMutateRowRequest, CheckAndMutateRowResponse, MutateRowRequest, MutateRowResponse,
    MutateRowsRequest, MutateRowsResponse, ReadModifyWriteRowRequest, ReadModifyWriteRowResponse,
    ReadRowsRequest, ReadRowsResponse, SampleRowKeysRequest, SampleRowKeysResponse,
};

use crate::{
    error::{ClientError, TransportResult},
    grpc::GrpcTransport,
    method::Method,
    path::{AppProfileName, InstanceName, TableName},
    stream::ResponseStream,
    transport::{CallOptions, Transport, TransportStream},
};

/// Client for the Bigtable data API.
///
/// Forwards each request, untouched, to its [Transport] and hands back the
/// transport's outcome: a single result for unary calls, a
/// [ResponseStream] for server streaming calls.
#[derive(Debug)]
pub struct BigtableClient<T> {
    transport: Arc<T>,
    /// Deadline overriding every [Method::default_timeout]
    timeout: Option<Duration>,
    instance: Option<InstanceName>,
    app_profile_id: Option<String>,
}

impl<T> Clone for BigtableClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
            instance: self.instance.clone(),
            app_profile_id: self.app_profile_id.clone(),
        }
    }
}

impl BigtableClient<GrpcTransport> {
    /// Connect to the instance described by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        if settings.project_id.is_empty() || settings.instance_id.is_empty() {
            return Err(ClientError::config(
                "Both project_id and instance_id must be set",
            ));
        }
        let instance = InstanceName::new(&settings.project_id, &settings.instance_id);
        let transport = GrpcTransport::connect(settings, &instance)?;

        let mut client = Self::new(transport).with_instance(instance);
        client.timeout = settings.rpc_timeout();
        client.app_profile_id = settings.app_profile_id.clone();
        Ok(client)
    }
}

impl<T: Transport + 'static> BigtableClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            timeout: None,
            instance: None,
            app_profile_id: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_instance(mut self, instance: InstanceName) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn project_id(&self) -> Option<&str> {
        self.instance.as_ref().map(InstanceName::project)
    }

    pub fn instance_name(&self) -> Option<&InstanceName> {
        self.instance.as_ref()
    }

    pub fn table_name(&self, table: &str) -> Option<TableName> {
        self.instance.as_ref().map(|instance| instance.table(table))
    }

    pub fn app_profile_name(&self, app_profile: &str) -> Option<AppProfileName> {
        self.instance
            .as_ref()
            .map(|instance| instance.app_profile(app_profile))
    }

    /// The configured app profile. Callers set it on their requests: the
    /// client never fills it in.
    pub fn app_profile_id(&self) -> Option<&str> {
        self.app_profile_id.as_deref()
    }

    /// The [CallOptions] used by the methods not taking explicit options
    pub fn call_options(&self, method: Method) -> CallOptions {
        let opt = CallOptions::for_method(method);
        match self.timeout {
            Some(timeout) => opt.timeout(timeout),
            None => opt,
        }
    }

    /// Stream the rows of a table
    pub fn read_rows(&self, req: &ReadRowsRequest) -> ResponseStream<ReadRowsResponse> {
        self.read_rows_opt(req, self.call_options(Method::ReadRows))
    }

    pub fn read_rows_opt(
        &self,
        req: &ReadRowsRequest,
        opt: CallOptions,
    ) -> ResponseStream<ReadRowsResponse> {
        self.streaming(Method::ReadRows, &req.table_name, req, opt, T::read_rows)
    }

    /// Stream a sample of row keys delimiting contiguous sections of a table
    pub fn sample_row_keys(
        &self,
        req: &SampleRowKeysRequest,
    ) -> ResponseStream<SampleRowKeysResponse> {
        self.sample_row_keys_opt(req, self.call_options(Method::SampleRowKeys))
    }

    pub fn sample_row_keys_opt(
        &self,
        req: &SampleRowKeysRequest,
        opt: CallOptions,
    ) -> ResponseStream<SampleRowKeysResponse> {
        self.streaming(
            Method::SampleRowKeys,
            &req.table_name,
            req,
            opt,
            T::sample_row_keys,
        )
    }

    /// Mutate many rows in a batch, streaming the per entry results
    pub fn mutate_rows(&self, req: &MutateRowsRequest) -> ResponseStream<MutateRowsResponse> {
        self.mutate_rows_opt(req, self.call_options(Method::MutateRows))
    }

    pub fn mutate_rows_opt(
        &self,
        req: &MutateRowsRequest,
        opt: CallOptions,
    ) -> ResponseStream<MutateRowsResponse> {
        self.streaming(Method::MutateRows, &req.table_name, req, opt, T::mutate_rows)
    }

    /// Atomically mutate a single row
    pub async fn mutate_row(&self, req: &MutateRowRequest) -> TransportResult<MutateRowResponse> {
        self.mutate_row_opt(req, self.call_options(Method::MutateRow))
            .await
    }

    pub async fn mutate_row_opt(
        &self,
        req: &MutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<MutateRowResponse> {
        log_call(Method::MutateRow, &req.table_name);
        let result = self.transport.mutate_row(req, opt).await;
        log_outcome(Method::MutateRow, &result);
        result
    }

    /// Atomically mutate a row based on whether a predicate filter matches
    pub async fn check_and_mutate_row(
        &self,
        req: &CheckAndMutateRowRequest,
    ) -> TransportResult<CheckAndMutateRowResponse> {
        self.check_and_mutate_row_opt(req, self.call_options(Method::CheckAndMutateRow))
            .await
    }

    pub async fn check_and_mutate_row_opt(
        &self,
        req: &CheckAndMutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<CheckAndMutateRowResponse> {
        log_call(Method::CheckAndMutateRow, &req.table_name);
        let result = self.transport.check_and_mutate_row(req, opt).await;
        log_outcome(Method::CheckAndMutateRow, &result);
        result
    }

    /// Atomically modify a row's latest cells, returning their new contents
    pub async fn read_modify_write_row(
        &self,
        req: &ReadModifyWriteRowRequest,
    ) -> TransportResult<ReadModifyWriteRowResponse> {
        self.read_modify_write_row_opt(req, self.call_options(Method::ReadModifyWriteRow))
            .await
    }

    pub async fn read_modify_write_row_opt(
        &self,
        req: &ReadModifyWriteRowRequest,
        opt: CallOptions,
    ) -> TransportResult<ReadModifyWriteRowResponse> {
        log_call(Method::ReadModifyWriteRow, &req.table_name);
        let result = self.transport.read_modify_write_row(req, opt).await;
        log_outcome(Method::ReadModifyWriteRow, &result);
        result
    }

    /// Defer `call` until the returned stream is first polled
    fn streaming<Req, Resp, F>(
        &self,
        method: Method,
        table_name: &str,
        req: &Req,
        opt: CallOptions,
        call: F,
    ) -> ResponseStream<Resp>
    where
        Req: Clone + 'static,
        F: FnOnce(&T, &Req, CallOptions) -> TransportResult<TransportStream<Resp>> + 'static,
    {
        log_call(method, table_name);
        let transport = Arc::clone(&self.transport);
        let req = req.clone();
        ResponseStream::new(method, move || call(&transport, &req, opt))
    }
}

fn log_call(method: Method, table_name: &str) {
    debug!("Forwarding call"; "method" => method.name(), "table_name" => table_name);
}

fn log_outcome<R>(method: Method, result: &TransportResult<R>) {
    if let Err(e) = result {
        debug!("Call failed"; "method" => method.name(), "code" => ?e.code(), "error" => e.message());
    } else {
        trace!("Call succeeded"; "method" => method.name());
    }
}
