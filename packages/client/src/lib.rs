//! # dapr-client
//!
//! Blocking client for the Dapr sidecar.
//!
//! A [`Client`] talks to the sidecar over gRPC and exposes its building blocks
//! as plain method calls:
//!
//! - **State**: single-key get/save/delete with ETags and consistency levels,
//!   plus bulk get and bulk save.
//! - **Pub/sub**: publish raw bytes or any [`Payload`] onto a topic.
//! - **Service invocation**: call a method on another app.
//! - **Output bindings**: fire a binding operation.
//!
//! ```ignore
//! use dapr_client::{Client, Json};
//!
//! let client = Client::new()?;
//!
//! client.publish_event_from_content("messagebus", "demo", &Json(&order))?;
//!
//! client.save_state("statestore", "key1", "hello")?;
//! let item = client.get_state("statestore", "key1")?;
//!
//! // Only succeeds if nobody wrote key1 in between.
//! client.save_state_with_etag("statestore", "key1", "bye", &item.etag, None)?;
//! ```
//!
//! Settings come from a [`ClientConfig`]: `DAPR_GRPC_PORT` and
//! `DAPR_API_TOKEN` are read once when the client is built. Every failure is an
//! [`Error`]; see [`ErrorKind`] for the classification.
//!
//! Tests can swap the network out with `testing::InMemoryRuntime`, available
//! with the `testing` feature.

pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod payload;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod types;

mod binding;
mod bulk;
mod client;
mod invoke;
mod pubsub;
mod state;
mod validate;

pub use client::Client;
pub use config::{ClientConfig, ConfigSource, EnvSource};
pub use connection::ConnectionManager;
pub use context::CallContext;
pub use error::{Error, ErrorKind, Operation};
pub use payload::{Json, Payload};
pub use transport::{GrpcTransport, RuntimeRequest, RuntimeResponse, Transport};
pub use types::{
    BindingInvocation, BindingResponse, DataContent, HttpVerb, StateConcurrency,
    StateConsistency, StateItem, StateOptions,
};

// Re-exported so callers don't need a direct dependency for cancellation.
pub use tokio_util::sync::CancellationToken;
