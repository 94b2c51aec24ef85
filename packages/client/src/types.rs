use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use dapr_proto::common::v1 as proto;
use dapr_proto::common::v1::http_extension::Verb;
use dapr_proto::common::v1::state_options::{
    StateConcurrency as ProtoConcurrency, StateConsistency as ProtoConsistency,
};

/// Returned when parsing an enum from an unknown name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
}

/// How a write reacts to a stale ETag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateConcurrency {
    /// Store default.
    #[default]
    Unspecified,
    /// The write fails unless the supplied ETag matches the stored version.
    FirstWrite,
    /// The write overwrites regardless of ETag.
    LastWrite,
}

/// When the store acknowledges a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateConsistency {
    #[default]
    Unspecified,
    /// May acknowledge before the write has fully propagated.
    Eventual,
    /// Acknowledges only after durable commit.
    Strong,
}

impl StateConcurrency {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateConcurrency::Unspecified => "unspecified",
            StateConcurrency::FirstWrite => "first-write",
            StateConcurrency::LastWrite => "last-write",
        }
    }
}

impl StateConsistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateConsistency::Unspecified => "unspecified",
            StateConsistency::Eventual => "eventual",
            StateConsistency::Strong => "strong",
        }
    }
}

impl fmt::Display for StateConcurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StateConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateConcurrency {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unspecified" => Ok(StateConcurrency::Unspecified),
            "first-write" => Ok(StateConcurrency::FirstWrite),
            "last-write" => Ok(StateConcurrency::LastWrite),
            other => Err(ParseOptionError {
                kind: "concurrency",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for StateConsistency {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unspecified" => Ok(StateConsistency::Unspecified),
            "eventual" => Ok(StateConsistency::Eventual),
            "strong" => Ok(StateConsistency::Strong),
            other => Err(ParseOptionError {
                kind: "consistency",
                value: other.to_string(),
            }),
        }
    }
}

impl From<StateConcurrency> for ProtoConcurrency {
    fn from(value: StateConcurrency) -> Self {
        match value {
            StateConcurrency::Unspecified => ProtoConcurrency::ConcurrencyUnspecified,
            StateConcurrency::FirstWrite => ProtoConcurrency::ConcurrencyFirstWrite,
            StateConcurrency::LastWrite => ProtoConcurrency::ConcurrencyLastWrite,
        }
    }
}

impl From<ProtoConcurrency> for StateConcurrency {
    fn from(value: ProtoConcurrency) -> Self {
        match value {
            ProtoConcurrency::ConcurrencyUnspecified => StateConcurrency::Unspecified,
            ProtoConcurrency::ConcurrencyFirstWrite => StateConcurrency::FirstWrite,
            ProtoConcurrency::ConcurrencyLastWrite => StateConcurrency::LastWrite,
        }
    }
}

impl From<StateConsistency> for ProtoConsistency {
    fn from(value: StateConsistency) -> Self {
        match value {
            StateConsistency::Unspecified => ProtoConsistency::ConsistencyUnspecified,
            StateConsistency::Eventual => ProtoConsistency::ConsistencyEventual,
            StateConsistency::Strong => ProtoConsistency::ConsistencyStrong,
        }
    }
}

impl From<ProtoConsistency> for StateConsistency {
    fn from(value: ProtoConsistency) -> Self {
        match value {
            ProtoConsistency::ConsistencyUnspecified => StateConsistency::Unspecified,
            ProtoConsistency::ConsistencyEventual => StateConsistency::Eventual,
            ProtoConsistency::ConsistencyStrong => StateConsistency::Strong,
        }
    }
}

/// Policy attached to a state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateOptions {
    #[serde(default)]
    pub concurrency: StateConcurrency,
    #[serde(default)]
    pub consistency: StateConsistency,
}

impl StateOptions {
    pub fn new(concurrency: StateConcurrency, consistency: StateConsistency) -> Self {
        Self {
            concurrency,
            consistency,
        }
    }
}

impl From<StateOptions> for proto::StateOptions {
    fn from(options: StateOptions) -> Self {
        proto::StateOptions {
            concurrency: ProtoConcurrency::from(options.concurrency) as i32,
            consistency: ProtoConsistency::from(options.consistency) as i32,
        }
    }
}

impl From<proto::StateOptions> for StateOptions {
    fn from(options: proto::StateOptions) -> Self {
        StateOptions {
            concurrency: options.concurrency().into(),
            consistency: options.consistency().into(),
        }
    }
}

/// A state record.
///
/// Reads return the key, value, ETag and metadata reported by the store; a
/// missing key reads as an item with an empty value and an empty ETag.
/// Writes additionally honor `options`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateItem {
    pub key: String,
    pub value: Bytes,
    /// Version token as reported by the store. Empty means no known version.
    pub etag: String,
    pub metadata: HashMap<String, String>,
    pub options: Option<StateOptions>,
}

impl StateItem {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// The item a read yields for a key that does not exist.
    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = etag.into();
        self
    }

    pub fn with_options(mut self, options: StateOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True when the store reported neither a value nor a version.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.etag.is_empty()
    }

    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

impl From<StateItem> for proto::StateItem {
    fn from(item: StateItem) -> Self {
        proto::StateItem {
            key: item.key,
            value: item.value,
            etag: item.etag,
            metadata: item.metadata,
            options: item.options.map(Into::into),
        }
    }
}

/// Raw payload with its content type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataContent {
    pub content_type: String,
    pub data: Bytes,
}

impl DataContent {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// HTTP verb forwarded to an invoked app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpVerb {
    #[default]
    None,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpVerb {
    /// Case-insensitive; unknown verbs map to [`HttpVerb::None`].
    pub fn parse(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => HttpVerb::Get,
            "HEAD" => HttpVerb::Head,
            "POST" => HttpVerb::Post,
            "PUT" => HttpVerb::Put,
            "DELETE" => HttpVerb::Delete,
            "CONNECT" => HttpVerb::Connect,
            "OPTIONS" => HttpVerb::Options,
            "TRACE" => HttpVerb::Trace,
            "PATCH" => HttpVerb::Patch,
            _ => HttpVerb::None,
        }
    }
}

impl From<HttpVerb> for Verb {
    fn from(verb: HttpVerb) -> Self {
        match verb {
            HttpVerb::None => Verb::None,
            HttpVerb::Get => Verb::Get,
            HttpVerb::Head => Verb::Head,
            HttpVerb::Post => Verb::Post,
            HttpVerb::Put => Verb::Put,
            HttpVerb::Delete => Verb::Delete,
            HttpVerb::Connect => Verb::Connect,
            HttpVerb::Options => Verb::Options,
            HttpVerb::Trace => Verb::Trace,
            HttpVerb::Patch => Verb::Patch,
        }
    }
}

/// An output binding call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingInvocation {
    /// Binding component name.
    pub name: String,
    /// Binding-specific operation, e.g. `create`.
    pub operation: String,
    pub data: Bytes,
    pub metadata: HashMap<String, String>,
}

impl BindingInvocation {
    pub fn new(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What an output binding returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingResponse {
    pub data: Bytes,
    pub metadata: HashMap<String, String>,
}
