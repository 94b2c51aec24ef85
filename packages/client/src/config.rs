//! Client configuration.
//!
//! Process-wide settings (sidecar port, API token) are read once, at the
//! boundary, into a [`ClientConfig`]. Nothing re-reads the environment after
//! construction.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_GRPC_PORT: &str = "50001";
pub const GRPC_PORT_ENV_VAR: &str = "DAPR_GRPC_PORT";
pub const API_TOKEN_ENV_VAR: &str = "DAPR_API_TOKEN";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A source of named configuration values.
///
/// Empty values are treated the same as missing ones.
pub trait ConfigSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

fn non_empty(source: &impl ConfigSource, name: &str) -> Option<String> {
    source.get(name).filter(|value| !value.is_empty())
}

/// Settings for connecting to the sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Sidecar gRPC address in `host:port` form.
    pub address: String,
    /// Token attached to every call as `dapr-api-token`.
    pub api_token: Option<String>,
    pub connect_timeout: Duration,
    /// Default deadline applied to every call, unless a call context
    /// overrides it.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            api_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }

    /// Local sidecar on the given port.
    pub fn for_port(port: &str) -> Self {
        Self::new(format!("{}:{}", DEFAULT_HOST, port))
    }

    /// Read `DAPR_GRPC_PORT` and `DAPR_API_TOKEN` from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_source(&EnvSource)
    }

    /// Build a config from any [`ConfigSource`], falling back to port
    /// `50001` on localhost.
    pub fn from_source(source: &impl ConfigSource) -> Self {
        let port = non_empty(source, GRPC_PORT_ENV_VAR)
            .unwrap_or_else(|| DEFAULT_GRPC_PORT.to_string());

        Self {
            api_token: non_empty(source, API_TOKEN_ENV_VAR),
            ..Self::for_port(&port)
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// The address as a URI tonic can dial.
    pub(crate) fn endpoint_uri(&self) -> String {
        if self.address.contains("://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_port(DEFAULT_GRPC_PORT)
    }
}
