use std::collections::BTreeMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Per-call settings: outgoing metadata, deadline and cancellation.
///
/// ```ignore
/// let token = CancellationToken::new();
/// let scoped = client.with_context(
///     CallContext::new()
///         .with_timeout(Duration::from_secs(2))
///         .with_cancellation(token.clone()),
/// );
/// scoped.save_state("statestore", "key1", "hello")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    metadata: BTreeMap<String, String>,
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outgoing metadata entry. gRPC metadata keys are lowercase ASCII.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_is_empty() {
        let ctx = CallContext::new();
        assert!(ctx.metadata().is_empty());
        assert!(ctx.timeout().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn cancellation_is_shared_with_token_clones() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());
        assert!(!ctx.is_cancelled());

        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn metadata_entries_overwrite_by_key() {
        let ctx = CallContext::new()
            .with_metadata("traceparent", "a")
            .with_metadata("traceparent", "b");
        assert_eq!(ctx.metadata().get("traceparent").map(String::as_str), Some("b"));
    }
}
