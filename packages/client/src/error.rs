use std::fmt;

use tonic::{Code, Status};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The runtime call an error belongs to, with the identifiers needed to
/// triage it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetState { store: String, key: String },
    GetBulkState { store: String, keys: Vec<String> },
    SaveState { store: String, key: String },
    SaveBulkState { store: String, keys: Vec<String> },
    DeleteState { store: String, key: String },
    PublishEvent { pubsub: String, topic: String },
    InvokeService { app_id: String, method: String },
    InvokeBinding { name: String, operation: String },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::GetState { store, key } => {
                write!(f, "error getting state for key '{}' from store '{}'", key, store)
            }
            Operation::GetBulkState { store, keys } => {
                write!(f, "error getting keys {} from store '{}'", KeyList(keys), store)
            }
            Operation::SaveState { store, key } => {
                write!(f, "error saving state for key '{}' into store '{}'", key, store)
            }
            Operation::SaveBulkState { store, keys } => {
                write!(f, "error saving keys {} into store '{}'", KeyList(keys), store)
            }
            Operation::DeleteState { store, key } => {
                write!(f, "error deleting key '{}' from store '{}'", key, store)
            }
            Operation::PublishEvent { pubsub, topic } => {
                write!(f, "error publishing event unto {} topic on pubsub '{}'", topic, pubsub)
            }
            Operation::InvokeService { app_id, method } => {
                write!(f, "error invoking method '{}' on app '{}'", method, app_id)
            }
            Operation::InvokeBinding { name, operation } => {
                write!(f, "error invoking binding '{}' with operation '{}'", name, operation)
            }
        }
    }
}

/// Most keys a bulk error message spells out.
const MAX_LISTED_KEYS: usize = 5;

/// `['a', 'b']`, or `['a', ... 'e'] and 3 more` past [`MAX_LISTED_KEYS`].
struct KeyList<'a>(&'a [String]);

impl fmt::Display for KeyList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, key) in self.0.iter().take(MAX_LISTED_KEYS).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}'", key)?;
        }
        f.write_str("]")?;
        if self.0.len() > MAX_LISTED_KEYS {
            write!(f, " and {} more", self.0.len() - MAX_LISTED_KEYS)?;
        }
        Ok(())
    }
}

/// Classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Serialization,
    Remote,
    Connection,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required identifier was empty. Raised before any RPC.
    #[error("{name} required")]
    InvalidArgument { name: &'static str },

    /// The payload could not be encoded. Raised before any RPC.
    #[error("error serializing input content: {source}")]
    Serialization {
        #[source]
        source: BoxError,
    },

    /// The RPC failed.
    #[error("{operation}: {} ({:?})", .status.message(), .status.code())]
    Remote {
        operation: Operation,
        #[source]
        status: Status,
    },

    /// The client could not be constructed.
    #[error("error creating connection to '{address}': {source}")]
    Connection {
        address: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str) -> Self {
        Error::InvalidArgument { name }
    }

    pub(crate) fn serialization(source: impl Into<BoxError>) -> Self {
        Error::Serialization {
            source: source.into(),
        }
    }

    pub(crate) fn connection(address: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Connection {
            address: address.into(),
            source: source.into(),
        }
    }

    /// Wrap a transport failure with the operation that produced it.
    ///
    /// Every facade call funnels its RPC errors through here.
    pub(crate) fn remote(operation: Operation, status: Status) -> Self {
        log::warn!("{}: {}", operation, status.message());
        Error::Remote { operation, status }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::Serialization { .. } => ErrorKind::Serialization,
            Error::Remote { .. } => ErrorKind::Remote,
            Error::Connection { .. } => ErrorKind::Connection,
        }
    }

    /// The gRPC status of a remote failure.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Error::Remote { status, .. } => Some(status),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Error::Remote { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// True when the runtime rejected a conditional write, typically an ETag
    /// mismatch under first-write-wins. The caller should re-read and retry.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.status().map(Status::code),
            Some(Code::Aborted) | Some(Code::FailedPrecondition)
        )
    }
}
