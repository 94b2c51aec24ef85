//! Async client for the `dapr.proto.runtime.v1.Dapr` service.

use http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{IntoRequest, Request, Response, Status};
use tonic_prost::ProstCodec;

use super::{
    DeleteStateRequest, GetBulkStateRequest, GetBulkStateResponse, GetStateRequest,
    GetStateResponse, InvokeBindingRequest, InvokeBindingResponse, InvokeServiceRequest,
    PublishEventRequest, SaveStateRequest,
};
use crate::common::v1::InvokeResponse;

/// gRPC client for the runtime API over a tonic [`Channel`].
///
/// Cloning is cheap; clones multiplex over the same channel.
#[derive(Debug, Clone)]
pub struct DaprClient {
    inner: tonic::client::Grpc<Channel>,
}

impl DaprClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Connect to `dst`, e.g. `http://127.0.0.1:50001`.
    pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
    where
        D: TryInto<tonic::transport::Endpoint>,
        D::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let channel = tonic::transport::Endpoint::new(dst)?.connect().await?;
        Ok(Self::new(channel))
    }

    async fn unary<Req, Resp>(
        &mut self,
        request: Request<Req>,
        path: &'static str,
    ) -> Result<Response<Resp>, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {}", e)))?;
        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        self.inner
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
    }

    pub async fn invoke_service(
        &mut self,
        request: impl IntoRequest<InvokeServiceRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        self.unary(
            request.into_request(),
            "/dapr.proto.runtime.v1.Dapr/InvokeService",
        )
        .await
    }

    pub async fn get_state(
        &mut self,
        request: impl IntoRequest<GetStateRequest>,
    ) -> Result<Response<GetStateResponse>, Status> {
        self.unary(request.into_request(), "/dapr.proto.runtime.v1.Dapr/GetState")
            .await
    }

    pub async fn get_bulk_state(
        &mut self,
        request: impl IntoRequest<GetBulkStateRequest>,
    ) -> Result<Response<GetBulkStateResponse>, Status> {
        self.unary(
            request.into_request(),
            "/dapr.proto.runtime.v1.Dapr/GetBulkState",
        )
        .await
    }

    pub async fn save_state(
        &mut self,
        request: impl IntoRequest<SaveStateRequest>,
    ) -> Result<Response<()>, Status> {
        self.unary(request.into_request(), "/dapr.proto.runtime.v1.Dapr/SaveState")
            .await
    }

    pub async fn delete_state(
        &mut self,
        request: impl IntoRequest<DeleteStateRequest>,
    ) -> Result<Response<()>, Status> {
        self.unary(
            request.into_request(),
            "/dapr.proto.runtime.v1.Dapr/DeleteState",
        )
        .await
    }

    pub async fn publish_event(
        &mut self,
        request: impl IntoRequest<PublishEventRequest>,
    ) -> Result<Response<()>, Status> {
        self.unary(
            request.into_request(),
            "/dapr.proto.runtime.v1.Dapr/PublishEvent",
        )
        .await
    }

    pub async fn invoke_binding(
        &mut self,
        request: impl IntoRequest<InvokeBindingRequest>,
    ) -> Result<Response<InvokeBindingResponse>, Status> {
        self.unary(
            request.into_request(),
            "/dapr.proto.runtime.v1.Dapr/InvokeBinding",
        )
        .await
    }
}
