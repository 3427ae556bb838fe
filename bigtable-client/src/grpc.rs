use std::{fmt, sync::Arc};

use async_trait::async_trait;
use bigtable_settings::Settings;
use futures::{StreamExt, TryStreamExt};
use google_cloud_rust_raw::bigtable::v2::{
    bigtable::{
        CheckAndMutateRowRequest, CheckAndMutateRowResponse, MutateRowRequest, MutateRowResponse,
        MutateRowsRequest, MutateRowsResponse, ReadModifyWriteRowRequest,
        ReadModifyWriteRowResponse, ReadRowsRequest, ReadRowsResponse, SampleRowKeysRequest,
        SampleRowKeysResponse,
    },
    bigtable_grpc::BigtableClient as GrpcBigtableClient,
};
use grpcio::{CallOption, Channel, ChannelBuilder, ChannelCredentials, EnvBuilder, Metadata};

use crate::{
    error::{ClientError, TransportError, TransportResult},
    metadata::MetadataBuilder,
    path::InstanceName,
    transport::{CallOptions, Transport, TransportStream},
};

/// A [Transport] over a gRPC channel to Bigtable (or its emulator)
#[derive(Clone)]
pub struct GrpcTransport {
    client: GrpcBigtableClient,
    /// The instance name, sent as the resource prefix header
    resource_prefix: String,
}

impl GrpcTransport {
    pub fn new(channel: Channel, instance: &InstanceName) -> Self {
        Self {
            client: GrpcBigtableClient::new(channel),
            resource_prefix: instance.to_string(),
        }
    }

    /// Create the underlying gRPC Channel and a transport over it
    pub fn connect(settings: &Settings, instance: &InstanceName) -> Result<Self, ClientError> {
        // Set up the gRPC environment.
        let env = Arc::new(EnvBuilder::new().build());
        let builder = ChannelBuilder::new(env)
            // Set the max size to correspond to server-side limits.
            .max_send_message_len(settings.max_message_len)
            .max_receive_message_len(settings.max_message_len);
        let channel = if let Some(emulator_host) = &settings.emulator_host {
            debug!("Connecting to the Bigtable emulator"; "address" => emulator_host.as_str());
            builder.connect(emulator_host)
        } else {
            // Requires
            // GOOGLE_APPLICATION_CREDENTIALS=/path/to/service-account.json
            let creds = ChannelCredentials::google_default_credentials()?;
            debug!("Connecting to Bigtable"; "address" => settings.endpoint.as_str());
            builder.secure_connect(&settings.endpoint, creds)
        };
        Ok(Self::new(channel, instance))
    }

    /// The headers sent with a call against `table_name`: the resource
    /// prefix, routing params taken from the request and any caller headers
    fn metadata(
        &self,
        table_name: &str,
        app_profile_id: &str,
        opt: &CallOptions,
    ) -> grpcio::Result<Metadata> {
        opt.headers
            .iter()
            .fold(
                MetadataBuilder::with_prefix(&self.resource_prefix)
                    .routing_param("table_name", table_name)
                    .routing_param("app_profile_id", app_profile_id),
                |builder, (key, value)| builder.header(key, value),
            )
            .build()
    }

    /// Build the [CallOption] for a call against `table_name`
    fn call_option(
        &self,
        table_name: &str,
        app_profile_id: &str,
        opt: &CallOptions,
    ) -> TransportResult<CallOption> {
        let call_opt =
            CallOption::default().headers(self.metadata(table_name, app_profile_id, opt)?);
        Ok(match opt.timeout {
            Some(timeout) => call_opt.timeout(timeout),
            None => call_opt,
        })
    }
}

impl fmt::Debug for GrpcTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcTransport")
            .field("resource_prefix", &self.resource_prefix)
            .finish()
    }
}

#[async_trait(?Send)]
impl Transport for GrpcTransport {
    fn read_rows(
        &self,
        req: &ReadRowsRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<ReadRowsResponse>> {
        let opt = self.call_option(&req.table_name, &req.app_profile_id, &opt)?;
        let stream = self.client.read_rows_opt(req, opt)?;
        Ok(stream.map_err(TransportError::from).boxed_local())
    }

    fn sample_row_keys(
        &self,
        req: &SampleRowKeysRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<SampleRowKeysResponse>> {
        let opt = self.call_option(&req.table_name, &req.app_profile_id, &opt)?;
        let stream = self.client.sample_row_keys_opt(req, opt)?;
        Ok(stream.map_err(TransportError::from).boxed_local())
    }

    fn mutate_rows(
        &self,
        req: &MutateRowsRequest,
        opt: CallOptions,
    ) -> TransportResult<TransportStream<MutateRowsResponse>> {
        let opt = self.call_option(&req.table_name, &req.app_profile_id, &opt)?;
        let stream = self.client.mutate_rows_opt(req, opt)?;
        Ok(stream.map_err(TransportError::from).boxed_local())
    }

    async fn mutate_row(
        &self,
        req: &MutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<MutateRowResponse> {
        let opt = self.call_option(&req.table_name, &req.app_profile_id, &opt)?;
        Ok(self.client.mutate_row_async_opt(req, opt)?.await?)
    }

    async fn check_and_mutate_row(
        &self,
        req: &CheckAndMutateRowRequest,
        opt: CallOptions,
    ) -> TransportResult<CheckAndMutateRowResponse> {
        let opt = self.call_option(&req.table_name, &req.app_profile_id, &opt)?;
        Ok(self.client.check_and_mutate_row_async_opt(req, opt)?.await?)
    }

    async fn read_modify_write_row(
        &self,
        req: &ReadModifyWriteRowRequest,
        opt: CallOptions,
    ) -> TransportResult<ReadModifyWriteRowResponse> {
        let opt = self.call_option(&req.table_name, &req.app_profile_id, &opt)?;
        Ok(self
            .client
            .read_modify_write_row_async_opt(req, opt)?
            .await?)
    }
}
