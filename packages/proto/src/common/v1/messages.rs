//! `dapr.proto.common.v1`

use std::collections::HashMap;

use bytes::Bytes;

/// HTTP extension carried on a service invocation when the target app speaks
/// HTTP.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpExtension {
    #[prost(enumeration = "http_extension::Verb", tag = "1")]
    pub verb: i32,
    #[prost(map = "string, string", tag = "2")]
    pub querystring: HashMap<String, String>,
}

pub mod http_extension {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Verb {
        None = 0,
        Get = 1,
        Head = 2,
        Post = 3,
        Put = 4,
        Delete = 5,
        Connect = 6,
        Options = 7,
        Trace = 8,
        Patch = 9,
    }
}

/// The message sent to the target app of a service invocation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRequest {
    #[prost(string, tag = "1")]
    pub method: String,
    #[prost(message, optional, tag = "2")]
    pub data: Option<prost_types::Any>,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(message, optional, tag = "4")]
    pub http_extension: Option<HttpExtension>,
}

/// The response returned by the target app of a service invocation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeResponse {
    #[prost(message, optional, tag = "1")]
    pub data: Option<prost_types::Any>,
    #[prost(string, tag = "2")]
    pub content_type: String,
}

/// A single state entry as written to a state store.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StateItem {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub value: Bytes,
    #[prost(string, tag = "3")]
    pub etag: String,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
    #[prost(message, optional, tag = "5")]
    pub options: Option<StateOptions>,
}

/// Concurrency and consistency policy for a state write.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct StateOptions {
    #[prost(enumeration = "state_options::StateConcurrency", tag = "1")]
    pub concurrency: i32,
    #[prost(enumeration = "state_options::StateConsistency", tag = "2")]
    pub consistency: i32,
}

pub mod state_options {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum StateConcurrency {
        ConcurrencyUnspecified = 0,
        ConcurrencyFirstWrite = 1,
        ConcurrencyLastWrite = 2,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum StateConsistency {
        ConsistencyUnspecified = 0,
        ConsistencyEventual = 1,
        ConsistencyStrong = 2,
    }
}
