use std::sync::atomic::{AtomicBool, Ordering};

use tonic::Status;

use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::Error;
use crate::transport::{GrpcTransport, RuntimeRequest, RuntimeResponse, Transport};

/// Metadata key the sidecar reads the API token from.
pub const API_TOKEN_HEADER: &str = "dapr-api-token";

/// Owns the channel to the sidecar.
///
/// Immutable after construction apart from [`close`](Self::close), so it can
/// be shared across threads without external locking.
pub struct ConnectionManager {
    transport: Box<dyn Transport>,
    api_token: Option<String>,
    closed: AtomicBool,
}

impl ConnectionManager {
    /// Dial the sidecar at `config.address`. No retries.
    pub fn connect(config: &ClientConfig) -> Result<Self, Error> {
        if config.address.is_empty() {
            return Err(Error::connection("", "address required"));
        }
        log::info!("dapr client initializing for: {}", config.address);
        let transport = GrpcTransport::connect(config)?;
        Ok(Self::with_transport(transport, config.api_token.clone()))
    }

    pub fn with_transport(transport: impl Transport + 'static, api_token: Option<String>) -> Self {
        Self {
            transport: Box::new(transport),
            api_token,
            closed: AtomicBool::new(false),
        }
    }

    /// Attach the API token to `base`, if one is configured.
    pub fn authenticated_context(&self, base: CallContext) -> CallContext {
        match &self.api_token {
            Some(token) => base.with_metadata(API_TOKEN_HEADER, token.clone()),
            None => base,
        }
    }

    /// Send one request and wait for its reply.
    pub fn send(
        &self,
        context: &CallContext,
        request: RuntimeRequest,
    ) -> Result<RuntimeResponse, Status> {
        if self.is_closed() {
            return Err(Status::unavailable("connection closed"));
        }
        if context.is_cancelled() {
            return Err(Status::cancelled("call cancelled by caller"));
        }
        log::debug!("calling {}", request.method());
        self.transport.call(context, request)
    }

    /// Release the channel. Only the first call has an effect.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            log::info!("dapr client closing connection");
            self.transport.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}
