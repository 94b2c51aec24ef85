//! # dapr-proto
//!
//! Wire types for the Dapr runtime API.
//!
//! This crate carries the protobuf messages of `dapr.proto.common.v1` and
//! `dapr.proto.runtime.v1` that the client consumes, plus an async gRPC client
//! for the `Dapr` service. The messages are declared with `prost` derives so
//! the crate builds without `protoc`.
//!
//! Only the unary calls used by the client are covered: publish, service
//! invocation, output bindings and the state API.
//!
//! ```ignore
//! use dapr_proto::runtime::v1::{dapr_client::DaprClient, GetStateRequest};
//!
//! let channel = tonic::transport::Endpoint::from_static("http://127.0.0.1:50001")
//!     .connect()
//!     .await?;
//! let mut client = DaprClient::new(channel);
//! let response = client
//!     .get_state(tonic::Request::new(GetStateRequest {
//!         store_name: "statestore".into(),
//!         key: "key1".into(),
//!         ..Default::default()
//!     }))
//!     .await?;
//! ```

pub mod common {
    pub mod v1 {
        mod messages;
        pub use messages::*;
    }
}

pub mod runtime {
    pub mod v1 {
        mod messages;
        pub use messages::*;

        pub mod dapr_client;
    }
}
