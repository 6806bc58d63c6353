use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::provider::{Ledger, LedgerError, LedgerPayload, LedgerTag};

/// In-memory ledger
///
/// Clones share one board, so a verifier and any number of nodes can each
/// hold their own handle.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    inner: Arc<RwLock<MemoryLedgerInner>>,
}

#[derive(Debug, Default)]
struct MemoryLedgerInner {
    entries: HashMap<LedgerTag, LedgerPayload>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryLedgerError {
    #[error("memory ledger error: {0}")]
    Internal(String),
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryLedgerInner::default())),
        }
    }

    /// Number of tags with a payload
    pub fn len(&self) -> Result<usize, LedgerError<MemoryLedgerError>> {
        let inner = self.inner.read().map_err(|e| {
            LedgerError::Provider(MemoryLedgerError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })?;
        Ok(inner.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError<MemoryLedgerError>> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    type Error = MemoryLedgerError;

    async fn publish(
        &self,
        tag: LedgerTag,
        payload: LedgerPayload,
    ) -> Result<(), LedgerError<Self::Error>> {
        if payload.kind() != tag.kind {
            return Err(LedgerError::KindMismatch {
                tag: tag.kind,
                payload: payload.kind(),
            });
        }

        let mut inner = self.inner.write().map_err(|e| {
            LedgerError::Provider(MemoryLedgerError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })?;

        if inner.entries.insert(tag, payload).is_some() {
            tracing::debug!(%tag, "replaced ledger entry");
        }
        Ok(())
    }

    async fn query(
        &self,
        tag: &LedgerTag,
    ) -> Result<Option<LedgerPayload>, LedgerError<Self::Error>> {
        let inner = self.inner.read().map_err(|e| {
            LedgerError::Provider(MemoryLedgerError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })?;

        Ok(inner.entries.get(tag).cloned())
    }
}
