//! Single-item state operations.

use std::collections::HashMap;

use bytes::Bytes;

use dapr_proto::common::v1::state_options::StateConsistency as ProtoConsistency;
use dapr_proto::runtime::v1::{DeleteStateRequest, GetStateRequest, SaveStateRequest};

use crate::client::{unexpected_response, Client};
use crate::error::{Error, Operation};
use crate::transport::{RuntimeRequest, RuntimeResponse};
use crate::types::{StateConsistency, StateItem, StateOptions};
use crate::validate::require;

impl Client {
    /// Read one key. A key that was never written reads as an item with an
    /// empty value and an empty ETag.
    pub fn get_state(&self, store: &str, key: &str) -> Result<StateItem, Error> {
        self.get_state_with_consistency(store, key, StateConsistency::Unspecified)
    }

    pub fn get_state_with_consistency(
        &self,
        store: &str,
        key: &str,
        consistency: StateConsistency,
    ) -> Result<StateItem, Error> {
        require(store, "store name")?;
        require(key, "key")?;

        let operation = Operation::GetState {
            store: store.to_string(),
            key: key.to_string(),
        };
        let request = GetStateRequest {
            store_name: store.to_string(),
            key: key.to_string(),
            consistency: ProtoConsistency::from(consistency) as i32,
            metadata: HashMap::new(),
        };

        match self.call(&operation, RuntimeRequest::GetState(request))? {
            RuntimeResponse::GetState(response) => Ok(StateItem {
                key: key.to_string(),
                value: response.data,
                etag: response.etag,
                metadata: response.metadata,
                options: None,
            }),
            _ => Err(unexpected_response(&operation, "GetStateResponse")),
        }
    }

    /// Unconditional write.
    pub fn save_state(
        &self,
        store: &str,
        key: &str,
        value: impl Into<Bytes>,
    ) -> Result<(), Error> {
        self.save_state_item(store, StateItem::new(key, value))
    }

    /// Write guarded by `etag`. Under first-write-wins a stale ETag fails with
    /// a conflict (see [`Error::is_conflict`]); the write is not retried.
    pub fn save_state_with_etag(
        &self,
        store: &str,
        key: &str,
        value: impl Into<Bytes>,
        etag: &str,
        options: Option<StateOptions>,
    ) -> Result<(), Error> {
        let mut item = StateItem::new(key, value).with_etag(etag);
        item.options = options;
        self.save_state_item(store, item)
    }

    /// Write a fully specified item as a single-item request.
    pub fn save_state_item(&self, store: &str, item: StateItem) -> Result<(), Error> {
        require(store, "store name")?;
        require(&item.key, "key")?;

        let operation = Operation::SaveState {
            store: store.to_string(),
            key: item.key.clone(),
        };
        let request = SaveStateRequest {
            store_name: store.to_string(),
            states: vec![item.into()],
        };

        match self.call(&operation, RuntimeRequest::SaveState(request))? {
            RuntimeResponse::Empty => Ok(()),
            _ => Err(unexpected_response(&operation, "Empty")),
        }
    }

    /// Unconditional delete. Deleting a missing key is not an error unless
    /// the store says so.
    pub fn delete_state(&self, store: &str, key: &str) -> Result<(), Error> {
        self.delete_state_with_etag(store, key, "", None)
    }

    pub fn delete_state_with_etag(
        &self,
        store: &str,
        key: &str,
        etag: &str,
        options: Option<StateOptions>,
    ) -> Result<(), Error> {
        require(store, "store name")?;
        require(key, "key")?;

        let operation = Operation::DeleteState {
            store: store.to_string(),
            key: key.to_string(),
        };
        let request = DeleteStateRequest {
            store_name: store.to_string(),
            key: key.to_string(),
            etag: etag.to_string(),
            options: options.map(Into::into),
            metadata: HashMap::new(),
        };

        match self.call(&operation, RuntimeRequest::DeleteState(request))? {
            RuntimeResponse::Empty => Ok(()),
            _ => Err(unexpected_response(&operation, "Empty")),
        }
    }
}
