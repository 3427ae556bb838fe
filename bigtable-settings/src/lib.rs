//! Client settings objects and initialization

#[macro_use]
extern crate slog_scope;

use std::time::Duration;

use bigtable_common::{BIGTABLE_ADDRESS, MAX_MESSAGE_LEN};
use config::{Config, ConfigError, Environment, File};
use serde_derive::Deserialize;

static PREFIX: &str = "bigtable";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The Google Cloud project owning the Bigtable instance
    pub project_id: String,
    /// The Bigtable instance id (not the full resource name)
    pub instance_id: String,
    /// Optional app profile used to route requests
    pub app_profile_id: Option<String>,

    /// The `host:port` of the Bigtable data API
    pub endpoint: String,
    /// Bigtable emulator `host:port`. When set, a plaintext channel is used
    /// and no credentials are loaded.
    pub emulator_host: Option<String>,

    /// Max size of sent and received gRPC messages, in bytes
    pub max_message_len: i32,
    /// Deadline applied to every call, in milliseconds. Overrides the
    /// per-method defaults when set.
    pub rpc_timeout_ms: Option<u64>,

    pub human_logs: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            project_id: "".to_owned(),
            instance_id: "".to_owned(),
            app_profile_id: None,
            endpoint: BIGTABLE_ADDRESS.to_owned(),
            emulator_host: None,
            max_message_len: MAX_MESSAGE_LEN,
            rpc_timeout_ms: None,
            human_logs: false,
        }
    }
}

impl Settings {
    /// Load the settings from the config file if supplied, then the environment.
    pub fn with_env_and_config_file(filename: Option<&str>) -> Result<Self, ConfigError> {
        let mut s = Config::default();

        // Merge the config file if supplied
        if let Some(config_filename) = filename {
            s.merge(File::with_name(config_filename))?;
        }

        // Merge the environment overrides
        // While the prefix is currently case insensitive, it's traditional that
        // environment vars be UPPERCASE, this ensures that will continue should
        // Environment ever change their policy about case insensitivity.
        // This will accept environment variables specified as
        // `BIGTABLE_EMULATOR_HOST="localhost:8086"` as `emulator_host = "localhost:8086"`
        s.merge(Environment::with_prefix(&PREFIX.to_uppercase()).separator("__"))?;

        match s.try_into::<Self>() {
            Ok(mut s) => {
                s.normalize();
                Ok(s)
            }
            // Configuration errors are not very sysop friendly, Try to make them
            // a bit more 3AM useful.
            Err(ConfigError::Message(v)) => {
                println!("Bad configuration: {:?}", &v);
                println!("Please set in config file or use environment variable.");
                println!(
                    "For example to set `project_id` use env var `{}_PROJECT_ID`\n",
                    PREFIX.to_uppercase()
                );
                error!("Configuration error: Value undefined {:?}", &v);
                Err(ConfigError::NotFound(v))
            }
            Err(e) => {
                error!("Configuration error: Other: {:?}", &e);
                Err(e)
            }
        }
    }

    pub fn normalize(&mut self) {
        // An empty app profile means the instance's default profile
        if matches!(self.app_profile_id.as_deref(), Some("")) {
            self.app_profile_id = None;
        }
        if matches!(self.emulator_host.as_deref(), Some("")) {
            self.emulator_host = None;
        }
        if self.max_message_len <= 0 {
            self.max_message_len = MAX_MESSAGE_LEN;
        }
    }

    /// Whether the Bigtable emulator's in use
    pub fn uses_emulator(&self) -> bool {
        self.emulator_host.is_some()
    }

    /// The deadline overriding every method's default, if configured
    pub fn rpc_timeout(&self) -> Option<Duration> {
        self.rpc_timeout_ms.map(Duration::from_millis)
    }

    /// The address the gRPC channel connects to
    pub fn address(&self) -> &str {
        self.emulator_host.as_deref().unwrap_or(&self.endpoint)
    }

    pub fn banner(&self) -> String {
        let profile = self.app_profile_id.as_deref().unwrap_or("default");
        format!(
            "{} ({}) projects/{}/instances/{} [app profile: {}]",
            self.address(),
            if self.uses_emulator() {
                "emulator"
            } else {
                "secure"
            },
            self.project_id,
            self.instance_id,
            profile
        )
    }
}
