/// gRPC metadata Resource prefix header
///
/// Generic across Google APIs. This "improves routing by the backend" as
/// described by other clients
pub(crate) const PREFIX_KEY: &str = "google-cloud-resource-prefix";

/// gRPC metadata Client information header
///
/// A `User-Agent` like header, likely its main use is for GCP's metrics
const METRICS_KEY: &str = "x-goog-api-client";

/// gRPC metadata Dynamic Routing header:
/// https://google.aip.dev/client-libraries/4222
///
/// Bigtable routes data requests by `table_name` and `app_profile_id`.
///
/// https://github.com/googleapis/googleapis/blob/master/google/bigtable/v2/bigtable.proto
pub(crate) const ROUTING_KEY: &str = "x-goog-request-params";

const USER_AGENT: &str = concat!("gl-rust/", env!("CARGO_PKG_VERSION"), " gccl/1.0");

/// Builds the [grpcio::Metadata] for Bigtable calls
#[derive(Default)]
pub struct MetadataBuilder<'a> {
    prefix: &'a str,
    routing_params: Vec<(&'a str, &'a str)>,
    headers: Vec<(&'a str, &'a str)>,
}

impl<'a> MetadataBuilder<'a> {
    /// Initialize a new builder with a [PREFIX_KEY] header for the given
    /// resource
    pub fn with_prefix(prefix: &'a str) -> Self {
        Self {
            prefix,
            ..Default::default()
        }
    }

    /// Add a [ROUTING_KEY] param. Empty values are omitted
    pub fn routing_param(mut self, key: &'a str, value: &'a str) -> Self {
        if !value.is_empty() {
            self.routing_params.push((key, value));
        }
        self
    }

    /// Add an arbitrary header
    pub fn header(mut self, key: &'a str, value: &'a str) -> Self {
        self.headers.push((key, value));
        self
    }

    /// Build the [grpcio::Metadata]
    pub fn build(self) -> Result<grpcio::Metadata, grpcio::Error> {
        let mut meta = grpcio::MetadataBuilder::new();

        if !self.prefix.is_empty() {
            meta.add_str(PREFIX_KEY, self.prefix)?;
        }
        meta.add_str(METRICS_KEY, USER_AGENT)?;
        for (key, value) in &self.headers {
            meta.add_str(key, value)?;
        }
        if !self.routing_params.is_empty() {
            meta.add_str(ROUTING_KEY, &self.routing_header())?;
        }
        Ok(meta.build())
    }

    fn routing_header(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (key, val) in &self.routing_params {
            ser.append_pair(key, val);
        }
        // python-api-core doesn't encode '/':
        // https://github.com/googleapis/python-api-core/blob/6251eab/google/api_core/gapic_v1/routing_header.py#L85
        ser.finish().replace("%2F", "/")
    }
}
