use std::sync::Arc;

use tonic::transport::Channel;
use tonic::Status;

use crate::config::{ClientConfig, DEFAULT_HOST};
use crate::connection::ConnectionManager;
use crate::context::CallContext;
use crate::error::{Error, Operation};
use crate::transport::{GrpcTransport, RuntimeRequest, RuntimeResponse, Transport};

/// Blocking client for the sidecar.
///
/// Clones share one connection; closing any of them closes all of them.
///
/// # Example
///
/// ```ignore
/// use dapr_client::Client;
///
/// let client = Client::new()?;
///
/// client.publish_event("messagebus", "demo", r#"{"message":"hello"}"#)?;
/// client.save_state("statestore", "key1", "hello")?;
///
/// let item = client.get_state("statestore", "key1")?;
/// println!("[key:{} etag:{}]: {:?}", item.key, item.etag, item.value_str());
///
/// client.close();
/// ```
#[derive(Clone)]
pub struct Client {
    connection: Arc<ConnectionManager>,
    context: CallContext,
}

impl Client {
    /// Connect to the local sidecar on `DAPR_GRPC_PORT` (default `50001`).
    pub fn new() -> Result<Self, Error> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Connect to the local sidecar on the given port.
    pub fn with_port(port: &str) -> Result<Self, Error> {
        if port.is_empty() {
            return Err(Error::connection("", "port required"));
        }
        Self::with_address(format!("{}:{}", DEFAULT_HOST, port))
    }

    /// Connect to the sidecar at `host:port`. The API token still comes from
    /// the environment.
    pub fn with_address(address: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(ClientConfig::from_env().with_address(address))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        let connection = ConnectionManager::connect(&config)?;
        Ok(Self::from_parts(connection, &config))
    }

    /// Reuse a channel created elsewhere. The API token comes from the
    /// environment.
    pub fn with_channel(channel: Channel) -> Result<Self, Error> {
        let config = ClientConfig::from_env();
        let transport = GrpcTransport::from_channel(channel)?;
        Ok(Self::with_transport(transport, &config))
    }

    /// Build a client over any [`Transport`]. Only the token and request
    /// timeout of `config` are used.
    pub fn with_transport(transport: impl Transport + 'static, config: &ClientConfig) -> Self {
        let connection = ConnectionManager::with_transport(transport, config.api_token.clone());
        Self::from_parts(connection, config)
    }

    fn from_parts(connection: ConnectionManager, config: &ClientConfig) -> Self {
        let mut context = CallContext::new();
        if let Some(timeout) = config.request_timeout {
            context = context.with_timeout(timeout);
        }
        Self {
            connection: Arc::new(connection),
            context,
        }
    }

    /// A clone whose calls use `context` instead of the default one.
    ///
    /// The configured request timeout is not carried over; set one on
    /// `context` if needed.
    pub fn with_context(&self, context: CallContext) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            context,
        }
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    /// Release the connection. Safe to call more than once; later calls on
    /// this client or its clones fail as [`Error::Remote`].
    pub fn close(&self) {
        self.connection.close();
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    /// Send one request with the client's context and the API token.
    pub(crate) fn call(
        &self,
        operation: &Operation,
        request: RuntimeRequest,
    ) -> Result<RuntimeResponse, Error> {
        let context = self.connection.authenticated_context(self.context.clone());
        self.connection
            .send(&context, request)
            .map_err(|status| Error::remote(operation.clone(), status))
    }
}

/// The runtime answered with a reply of the wrong shape.
pub(crate) fn unexpected_response(operation: &Operation, expected: &str) -> Error {
    Error::remote(
        operation.clone(),
        Status::internal(format!("unexpected response from runtime, expected {}", expected)),
    )
}
