//! `dapr.proto.runtime.v1`

use std::collections::HashMap;

use bytes::Bytes;

use crate::common::v1 as common;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeServiceRequest {
    /// App id of the callee.
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "3")]
    pub message: Option<common::InvokeRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(enumeration = "common::state_options::StateConsistency", tag = "3")]
    pub consistency: i32,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
    #[prost(string, tag = "2")]
    pub etag: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBulkStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, repeated, tag = "2")]
    pub keys: Vec<String>,
    /// Number of parallel reads the runtime may issue; zero means runtime default.
    #[prost(int32, tag = "3")]
    pub parallelism: i32,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBulkStateResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<BulkStateItem>,
}

/// One entry of a bulk read. `error` is set when the runtime failed to read
/// this key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkStateItem {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub data: Bytes,
    #[prost(string, tag = "3")]
    pub etag: String,
    #[prost(string, tag = "4")]
    pub error: String,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(string, tag = "3")]
    pub etag: String,
    #[prost(message, optional, tag = "4")]
    pub options: Option<common::StateOptions>,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SaveStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(message, repeated, tag = "2")]
    pub states: Vec<common::StateItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishEventRequest {
    #[prost(string, tag = "1")]
    pub pubsub_name: String,
    #[prost(string, tag = "2")]
    pub topic: String,
    #[prost(bytes = "bytes", tag = "3")]
    pub data: Bytes,
    #[prost(string, tag = "4")]
    pub data_content_type: String,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeBindingRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
    #[prost(string, tag = "4")]
    pub operation: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeBindingResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "2")]
    pub metadata: HashMap<String, String>,
}
