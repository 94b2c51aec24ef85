//! The send/receive seam between the facade and the wire.
//!
//! [`Transport`] is the only thing the connection manager needs from a
//! channel. [`GrpcTransport`] is the production implementation; tests use
//! `testing::InMemoryRuntime` from the `testing` feature.

use std::sync::RwLock;

use tokio::runtime::Runtime;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};

use dapr_proto::common::v1::InvokeResponse;
use dapr_proto::runtime::v1::dapr_client::DaprClient;
use dapr_proto::runtime::v1::{
    DeleteStateRequest, GetBulkStateRequest, GetBulkStateResponse, GetStateRequest,
    GetStateResponse, InvokeBindingRequest, InvokeBindingResponse, InvokeServiceRequest,
    PublishEventRequest, SaveStateRequest,
};

use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::Error;

/// A single runtime RPC.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeRequest {
    PublishEvent(PublishEventRequest),
    InvokeService(InvokeServiceRequest),
    InvokeBinding(InvokeBindingRequest),
    GetState(GetStateRequest),
    GetBulkState(GetBulkStateRequest),
    SaveState(SaveStateRequest),
    DeleteState(DeleteStateRequest),
}

impl RuntimeRequest {
    /// The gRPC method name.
    pub fn method(&self) -> &'static str {
        match self {
            RuntimeRequest::PublishEvent(_) => "PublishEvent",
            RuntimeRequest::InvokeService(_) => "InvokeService",
            RuntimeRequest::InvokeBinding(_) => "InvokeBinding",
            RuntimeRequest::GetState(_) => "GetState",
            RuntimeRequest::GetBulkState(_) => "GetBulkState",
            RuntimeRequest::SaveState(_) => "SaveState",
            RuntimeRequest::DeleteState(_) => "DeleteState",
        }
    }
}

/// The reply to a [`RuntimeRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeResponse {
    /// Calls that return `google.protobuf.Empty`.
    Empty,
    InvokeService(InvokeResponse),
    InvokeBinding(InvokeBindingResponse),
    GetState(GetStateResponse),
    GetBulkState(GetBulkStateResponse),
}

/// Executes runtime requests.
///
/// Implementations are shared across threads and must support concurrent
/// calls.
pub trait Transport: Send + Sync {
    /// Perform one RPC and wait for its reply.
    fn call(
        &self,
        context: &CallContext,
        request: RuntimeRequest,
    ) -> Result<RuntimeResponse, Status>;

    /// Release the underlying channel. Called at most once by the connection
    /// manager.
    fn close(&self) {}
}

/// Blocking gRPC transport.
///
/// Owns a small tokio runtime and drives the async tonic client on it, the
/// same way blocking HTTP clients wrap their async core. Calls must not be
/// made from inside another tokio runtime.
pub struct GrpcTransport {
    runtime: Runtime,
    client: RwLock<Option<DaprClient>>,
}

impl GrpcTransport {
    /// Dial the sidecar described by `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self, Error> {
        let runtime = Self::build_runtime().map_err(|e| Error::connection(&config.address, e))?;

        let endpoint = Endpoint::from_shared(config.endpoint_uri())
            .map_err(|e| Error::connection(&config.address, e))?
            .connect_timeout(config.connect_timeout);

        let client = runtime
            .block_on(DaprClient::connect(endpoint))
            .map_err(|e| Error::connection(&config.address, e))?;

        Ok(Self {
            runtime,
            client: RwLock::new(Some(client)),
        })
    }

    /// Wrap a channel created elsewhere.
    ///
    /// The runtime that created the channel must outlive this transport.
    pub fn from_channel(channel: Channel) -> Result<Self, Error> {
        let runtime =
            Self::build_runtime().map_err(|e| Error::connection("<existing channel>", e))?;
        Ok(Self {
            runtime,
            client: RwLock::new(Some(DaprClient::new(channel))),
        })
    }

    fn build_runtime() -> std::io::Result<Runtime> {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("dapr-client")
            .enable_all()
            .build()
    }

    /// A handle on the shared channel. Clones multiplex over one connection.
    fn client(&self) -> Result<DaprClient, Status> {
        let guard = self
            .client
            .read()
            .map_err(|e| Status::internal(format!("Lock error: {}", e)))?;
        guard
            .clone()
            .ok_or_else(|| Status::unavailable("connection closed"))
    }
}

impl Transport for GrpcTransport {
    fn call(
        &self,
        context: &CallContext,
        request: RuntimeRequest,
    ) -> Result<RuntimeResponse, Status> {
        let call = dispatch(self.client()?, context, request);

        self.runtime.block_on(async {
            let call = async {
                match context.timeout() {
                    Some(timeout) => match tokio::time::timeout(timeout, call).await {
                        Ok(result) => result,
                        Err(_) => Err(Status::deadline_exceeded("call deadline exceeded")),
                    },
                    None => call.await,
                }
            };

            match context.cancellation() {
                Some(token) => tokio::select! {
                    result = call => result,
                    _ = token.cancelled() => Err(Status::cancelled("call cancelled by caller")),
                },
                None => call.await,
            }
        })
    }

    fn close(&self) {
        if let Ok(mut client) = self.client.write() {
            client.take();
        }
    }
}

fn outgoing<T>(context: &CallContext, message: T) -> Result<Request<T>, Status> {
    let mut request = Request::new(message);
    if let Some(timeout) = context.timeout() {
        request.set_timeout(timeout);
    }
    for (name, value) in context.metadata() {
        let key = AsciiMetadataKey::from_bytes(name.as_bytes())
            .map_err(|_| Status::invalid_argument(format!("invalid metadata key '{}'", name)))?;
        let value: AsciiMetadataValue = value.parse().map_err(|_| {
            Status::invalid_argument(format!("invalid metadata value for '{}'", name))
        })?;
        request.metadata_mut().insert(key, value);
    }
    Ok(request)
}

async fn dispatch(
    mut client: DaprClient,
    context: &CallContext,
    request: RuntimeRequest,
) -> Result<RuntimeResponse, Status> {
    let response = match request {
        RuntimeRequest::PublishEvent(r) => {
            client.publish_event(outgoing(context, r)?).await?;
            RuntimeResponse::Empty
        }
        RuntimeRequest::InvokeService(r) => RuntimeResponse::InvokeService(
            client.invoke_service(outgoing(context, r)?).await?.into_inner(),
        ),
        RuntimeRequest::InvokeBinding(r) => RuntimeResponse::InvokeBinding(
            client.invoke_binding(outgoing(context, r)?).await?.into_inner(),
        ),
        RuntimeRequest::GetState(r) => RuntimeResponse::GetState(
            client.get_state(outgoing(context, r)?).await?.into_inner(),
        ),
        RuntimeRequest::GetBulkState(r) => RuntimeResponse::GetBulkState(
            client.get_bulk_state(outgoing(context, r)?).await?.into_inner(),
        ),
        RuntimeRequest::SaveState(r) => {
            client.save_state(outgoing(context, r)?).await?;
            RuntimeResponse::Empty
        }
        RuntimeRequest::DeleteState(r) => {
            client.delete_state(outgoing(context, r)?).await?;
            RuntimeResponse::Empty
        }
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::Client;
    use std::net::TcpListener;
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;
    use tonic::Code;

    /// A lazy channel to `address`, driven by `runtime`.
    fn lazy_channel(runtime: &Runtime, address: std::net::SocketAddr) -> Channel {
        let _guard = runtime.enter();
        Endpoint::from_shared(format!("http://{}", address))
            .unwrap()
            .connect_lazy()
    }

    /// A listener that accepts TCP but never speaks HTTP/2, so calls hang.
    fn silent_sidecar() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").unwrap()
    }

    #[test]
    fn method_names_match_service_definition() {
        let request = RuntimeRequest::GetState(GetStateRequest::default());
        assert_eq!(request.method(), "GetState");
        let request = RuntimeRequest::SaveState(SaveStateRequest::default());
        assert_eq!(request.method(), "SaveState");
    }

    #[test]
    fn outgoing_request_carries_metadata_and_timeout() {
        let context = CallContext::new()
            .with_metadata("dapr-api-token", "secret")
            .with_timeout(Duration::from_secs(3));

        let request = outgoing(&context, GetStateRequest::default()).unwrap();

        assert_eq!(
            request.metadata().get("dapr-api-token").and_then(|v| v.to_str().ok()),
            Some("secret")
        );
        assert!(request.metadata().get("grpc-timeout").is_some());
    }

    #[test]
    fn outgoing_request_rejects_invalid_metadata_key() {
        let context = CallContext::new().with_metadata("bad key", "x");
        let status = outgoing(&context, GetStateRequest::default()).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn connect_rejects_unparseable_address() {
        let config = ClientConfig::new("not a valid address");
        let err = GrpcTransport::connect(&config).err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Connection);
    }

    #[test]
    fn connect_fails_when_nothing_listens() {
        let config = ClientConfig::new("127.0.0.1:1").with_connect_timeout(Duration::from_secs(2));
        let err = GrpcTransport::connect(&config).err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Connection);
        assert!(err.to_string().contains("127.0.0.1:1"));
    }

    #[test]
    fn call_deadline_surfaces_as_deadline_exceeded() {
        let runtime = Runtime::new().unwrap();
        let sidecar = silent_sidecar();
        let channel = lazy_channel(&runtime, sidecar.local_addr().unwrap());
        let client = Client::with_channel(channel)
            .unwrap()
            .with_context(CallContext::new().with_timeout(Duration::from_millis(300)));

        let started = Instant::now();
        let err = client.save_state("statestore", "key1", "hello").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.status().map(Status::code), Some(Code::DeadlineExceeded));
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn cancelling_mid_call_surfaces_as_cancelled() {
        let runtime = Runtime::new().unwrap();
        let sidecar = silent_sidecar();
        let channel = lazy_channel(&runtime, sidecar.local_addr().unwrap());
        let token = CancellationToken::new();
        let client = Client::with_channel(channel)
            .unwrap()
            .with_context(CallContext::new().with_cancellation(token.clone()));

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            token.cancel();
        });
        let started = Instant::now();
        let err = client.get_state("statestore", "key1").unwrap_err();
        canceller.join().unwrap();

        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.status().map(Status::code), Some(Code::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn refused_connection_is_remote_and_names_the_target() {
        let runtime = Runtime::new().unwrap();
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = Client::with_channel(lazy_channel(&runtime, address))
            .unwrap()
            .with_context(CallContext::new().with_timeout(Duration::from_secs(5)));

        let err = client.get_state("statestore", "key1").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Remote);
        let message = err.to_string();
        assert!(message.contains("statestore"), "{}", message);
        assert!(message.contains("key1"), "{}", message);

        client.close();
        client.close();
        assert!(client.is_closed());
    }

    #[test]
    fn closed_transport_refuses_calls() {
        let runtime = Runtime::new().unwrap();
        let sidecar = silent_sidecar();
        let transport =
            GrpcTransport::from_channel(lazy_channel(&runtime, sidecar.local_addr().unwrap()))
                .unwrap();

        transport.close();
        let status = transport
            .call(
                &CallContext::new(),
                RuntimeRequest::GetState(GetStateRequest::default()),
            )
            .unwrap_err();

        assert_eq!(status.code(), Code::Unavailable);
    }
}
