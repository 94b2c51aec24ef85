//! Multi-key state operations.

use std::collections::HashMap;

use tonic::Status;

use dapr_proto::runtime::v1::{BulkStateItem, GetBulkStateRequest, SaveStateRequest};

use crate::client::{unexpected_response, Client};
use crate::error::{Error, Operation};
use crate::transport::{RuntimeRequest, RuntimeResponse};
use crate::types::StateItem;
use crate::validate::require;

/// Lets the runtime pick how many keys it fetches at once.
const DEFAULT_PARALLELISM: u32 = 0;

impl Client {
    /// Read several keys in one call.
    ///
    /// The result has one item per requested key, in request order. Keys the
    /// store does not have come back as empty items.
    pub fn get_bulk_state<I, K>(&self, store: &str, keys: I) -> Result<Vec<StateItem>, Error>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.get_bulk_state_with_parallelism(store, keys, DEFAULT_PARALLELISM)
    }

    /// Like [`get_bulk_state`](Self::get_bulk_state), capping how many keys
    /// the runtime reads concurrently.
    pub fn get_bulk_state_with_parallelism<I, K>(
        &self,
        store: &str,
        keys: I,
        parallelism: u32,
    ) -> Result<Vec<StateItem>, Error>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        require(store, "store name")?;
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(Error::invalid_argument("keys"));
        }
        for key in &keys {
            require(key, "key")?;
        }

        let operation = Operation::GetBulkState {
            store: store.to_string(),
            keys: keys.clone(),
        };
        let request = GetBulkStateRequest {
            store_name: store.to_string(),
            keys: keys.clone(),
            parallelism: i32::try_from(parallelism).unwrap_or(i32::MAX),
            metadata: HashMap::new(),
        };

        let items = match self.call(&operation, RuntimeRequest::GetBulkState(request))? {
            RuntimeResponse::GetBulkState(response) => response.items,
            _ => return Err(unexpected_response(&operation, "GetBulkStateResponse")),
        };

        in_request_order(&keys, items).map_err(|status| Error::remote(operation, status))
    }

    /// Write several items in one request.
    ///
    /// Each item keeps its own ETag and options. The items are never split
    /// across requests; whether the write is atomic is up to the store.
    pub fn save_bulk_state(&self, store: &str, items: Vec<StateItem>) -> Result<(), Error> {
        require(store, "store name")?;
        if items.is_empty() {
            return Err(Error::invalid_argument("items"));
        }
        for item in &items {
            require(&item.key, "key")?;
        }

        let operation = Operation::SaveBulkState {
            store: store.to_string(),
            keys: items.iter().map(|item| item.key.clone()).collect(),
        };
        let request = SaveStateRequest {
            store_name: store.to_string(),
            states: items.into_iter().map(Into::into).collect(),
        };

        match self.call(&operation, RuntimeRequest::SaveState(request))? {
            RuntimeResponse::Empty => Ok(()),
            _ => Err(unexpected_response(&operation, "Empty")),
        }
    }
}

/// Line the runtime's items up with the requested keys.
///
/// The runtime may answer in any order and may leave out keys it did not
/// find. Duplicate keys in the request each get a copy of the same item. Any
/// per-item error fails the whole read.
fn in_request_order(keys: &[String], items: Vec<BulkStateItem>) -> Result<Vec<StateItem>, Status> {
    let mut by_key: HashMap<String, BulkStateItem> = HashMap::with_capacity(items.len());
    for item in items {
        if !item.error.is_empty() {
            return Err(Status::internal(format!(
                "error reading key '{}': {}",
                item.key, item.error
            )));
        }
        by_key.insert(item.key.clone(), item);
    }

    let ordered = keys
        .iter()
        .map(|key| match by_key.get(key) {
            Some(item) => StateItem {
                key: key.clone(),
                value: item.data.clone(),
                etag: item.etag.clone(),
                metadata: item.metadata.clone(),
                options: None,
            },
            None => StateItem::missing(key.clone()),
        })
        .collect();
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn found(key: &str, data: &'static str, etag: &str) -> BulkStateItem {
        BulkStateItem {
            key: key.to_string(),
            data: Bytes::from_static(data.as_bytes()),
            etag: etag.to_string(),
            ..Default::default()
        }
    }

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn reorders_to_request_order() {
        let items = vec![found("c", "3", "e3"), found("a", "1", "e1"), found("b", "2", "e2")];

        let ordered = in_request_order(&keys(&["a", "b", "c"]), items).unwrap();

        let got: Vec<_> = ordered.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(got, ["a", "b", "c"]);
        assert_eq!(ordered[1].etag, "e2");
    }

    #[test]
    fn fills_missing_keys_with_empty_items() {
        let items = vec![found("k3", "3", "e3"), found("k1", "1", "e1")];

        let ordered = in_request_order(&keys(&["k1", "k2", "k3"]), items).unwrap();

        assert_eq!(ordered.len(), 3);
        assert!(ordered[1].is_empty());
        assert_eq!(ordered[1].key, "k2");
        assert_eq!(ordered[2].value, Bytes::from_static(b"3"));
    }

    #[test]
    fn per_item_error_fails_everything() {
        let items = vec![
            found("k1", "1", "e1"),
            BulkStateItem {
                key: "k2".to_string(),
                error: "store timed out".to_string(),
                ..Default::default()
            },
        ];

        let status = in_request_order(&keys(&["k1", "k2"]), items).unwrap_err();

        assert!(status.message().contains("k2"));
        assert!(status.message().contains("store timed out"));
    }

    #[test]
    fn duplicate_keys_each_get_an_item() {
        let items = vec![found("k1", "1", "e1")];
        let ordered = in_request_order(&keys(&["k1", "k1"]), items).unwrap();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0], ordered[1]);
    }
}
