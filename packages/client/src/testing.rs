//! In-memory stand-in for the sidecar.
//!
//! [`InMemoryRuntime`] implements [`Transport`] without a network. It keeps
//! state per store with numeric ETags, records every call together with its
//! outgoing metadata, and can be told to fail. Clones share the same state, so
//! a test can keep a handle for assertions after giving one to a client.
//!
//! ```ignore
//! let runtime = InMemoryRuntime::new();
//! let client = Client::with_transport(runtime.clone(), &ClientConfig::default());
//!
//! client.save_state("statestore", "key1", "hello")?;
//! assert_eq!(runtime.call_count(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use tonic::Status;

use dapr_proto::common::v1::state_options::StateConcurrency;
use dapr_proto::common::v1::{InvokeResponse, StateOptions};
use dapr_proto::runtime::v1::{
    BulkStateItem, DeleteStateRequest, GetBulkStateRequest, GetBulkStateResponse,
    GetStateRequest, GetStateResponse, InvokeBindingRequest, InvokeBindingResponse,
    InvokeServiceRequest, PublishEventRequest, SaveStateRequest,
};

use crate::context::CallContext;
use crate::transport::{RuntimeRequest, RuntimeResponse, Transport};

/// A call as seen by the runtime.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: RuntimeRequest,
    pub metadata: BTreeMap<String, String>,
}

impl RecordedCall {
    pub fn method(&self) -> &'static str {
        self.request.method()
    }
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: Bytes,
    version: u64,
    metadata: HashMap<String, String>,
}

#[derive(Default)]
struct RuntimeState {
    /// Keyed by (store, key).
    stores: HashMap<(String, String), StoredValue>,
    next_version: u64,
    calls: Vec<RecordedCall>,
    published: Vec<PublishEventRequest>,
    close_count: usize,
    fail_with: Option<Status>,
    failing_keys: HashMap<String, String>,
}

/// Fake sidecar for tests.
#[derive(Clone, Default)]
pub struct InMemoryRuntime {
    state: Arc<Mutex<RuntimeState>>,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent call with `status`. Calls are still recorded.
    pub fn fail_with(self, status: Status) -> Self {
        self.lock().fail_with = Some(status);
        self
    }

    /// Make reads of `key` fail with `message`, in any store.
    pub fn with_failing_key(self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.lock().failing_keys.insert(key.into(), message.into());
        self
    }

    /// Put a value straight into a store, bypassing the client. Returns its ETag.
    pub fn seed(&self, store: &str, key: &str, value: impl Into<Bytes>) -> String {
        let mut state = self.lock();
        let version = state.bump_version();
        state.stores.insert(
            (store.to_string(), key.to_string()),
            StoredValue {
                value: value.into(),
                version,
                metadata: HashMap::new(),
            },
        );
        version.to_string()
    }

    /// Current value and ETag of a key, if present.
    pub fn stored(&self, store: &str, key: &str) -> Option<(Bytes, String)> {
        self.lock()
            .stores
            .get(&(store.to_string(), key.to_string()))
            .map(|stored| (stored.value.clone(), stored.version.to_string()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn published(&self) -> Vec<PublishEventRequest> {
        self.lock().published.clone()
    }

    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    fn lock(&self) -> MutexGuard<'_, RuntimeState> {
        // A panic in another test thread must not cascade.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RuntimeState {
    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn check_etag(
        &self,
        store: &str,
        key: &str,
        etag: &str,
        options: Option<&StateOptions>,
    ) -> Result<(), Status> {
        let last_write = options
            .is_some_and(|o| o.concurrency() == StateConcurrency::ConcurrencyLastWrite);
        if etag.is_empty() || last_write {
            return Ok(());
        }
        let current = self
            .stores
            .get(&(store.to_string(), key.to_string()))
            .map(|stored| stored.version.to_string());
        match current {
            Some(current) if current == etag => Ok(()),
            _ => Err(Status::aborted(format!(
                "possible etag mismatch. error from state store: etag '{}' does not match for key '{}'",
                etag, key
            ))),
        }
    }

    fn get_state(&self, request: GetStateRequest) -> Result<GetStateResponse, Status> {
        if let Some(message) = self.failing_keys.get(&request.key) {
            return Err(Status::internal(message.clone()));
        }
        let response = match self.stores.get(&(request.store_name, request.key)) {
            Some(stored) => GetStateResponse {
                data: stored.value.clone(),
                etag: stored.version.to_string(),
                metadata: stored.metadata.clone(),
            },
            None => GetStateResponse::default(),
        };
        Ok(response)
    }

    /// Found keys only, in reverse request order. Callers must not rely on the
    /// runtime preserving order or reporting missing keys.
    fn get_bulk_state(&self, request: GetBulkStateRequest) -> GetBulkStateResponse {
        let items = request
            .keys
            .iter()
            .rev()
            .filter_map(|key| {
                if let Some(message) = self.failing_keys.get(key) {
                    return Some(BulkStateItem {
                        key: key.clone(),
                        error: message.clone(),
                        ..Default::default()
                    });
                }
                self.stores
                    .get(&(request.store_name.clone(), key.clone()))
                    .map(|stored| BulkStateItem {
                        key: key.clone(),
                        data: stored.value.clone(),
                        etag: stored.version.to_string(),
                        metadata: stored.metadata.clone(),
                        ..Default::default()
                    })
            })
            .collect();
        GetBulkStateResponse { items }
    }

    /// All items are checked before any is written.
    fn save_state(&mut self, request: SaveStateRequest) -> Result<(), Status> {
        for item in &request.states {
            self.check_etag(&request.store_name, &item.key, &item.etag, item.options.as_ref())?;
        }
        for item in request.states {
            let version = self.bump_version();
            self.stores.insert(
                (request.store_name.clone(), item.key),
                StoredValue {
                    value: item.value,
                    version,
                    metadata: item.metadata,
                },
            );
        }
        Ok(())
    }

    fn delete_state(&mut self, request: DeleteStateRequest) -> Result<(), Status> {
        self.check_etag(
            &request.store_name,
            &request.key,
            &request.etag,
            request.options.as_ref(),
        )?;
        self.stores.remove(&(request.store_name, request.key));
        Ok(())
    }

    /// Echoes the request payload back.
    fn invoke_service(request: InvokeServiceRequest) -> InvokeResponse {
        let message = request.message.unwrap_or_default();
        InvokeResponse {
            data: message.data,
            content_type: message.content_type,
        }
    }

    /// Echoes data and metadata back.
    fn invoke_binding(request: InvokeBindingRequest) -> InvokeBindingResponse {
        InvokeBindingResponse {
            data: request.data,
            metadata: request.metadata,
        }
    }
}

impl Transport for InMemoryRuntime {
    fn call(
        &self,
        context: &CallContext,
        request: RuntimeRequest,
    ) -> Result<RuntimeResponse, Status> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            request: request.clone(),
            metadata: context.metadata().clone(),
        });
        if let Some(status) = &state.fail_with {
            return Err(status.clone());
        }

        match request {
            RuntimeRequest::PublishEvent(r) => {
                state.published.push(r);
                Ok(RuntimeResponse::Empty)
            }
            RuntimeRequest::InvokeService(r) => Ok(RuntimeResponse::InvokeService(
                RuntimeState::invoke_service(r),
            )),
            RuntimeRequest::InvokeBinding(r) => Ok(RuntimeResponse::InvokeBinding(
                RuntimeState::invoke_binding(r),
            )),
            RuntimeRequest::GetState(r) => state.get_state(r).map(RuntimeResponse::GetState),
            RuntimeRequest::GetBulkState(r) => {
                Ok(RuntimeResponse::GetBulkState(state.get_bulk_state(r)))
            }
            RuntimeRequest::SaveState(r) => state.save_state(r).map(|_| RuntimeResponse::Empty),
            RuntimeRequest::DeleteState(r) => {
                state.delete_state(r).map(|_| RuntimeResponse::Empty)
            }
        }
    }

    fn close(&self) {
        self.lock().close_count += 1;
    }
}
