use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::keys::pooled_key;
use crate::crypto::NodeAddress;
use crate::ledger::{Ledger, LedgerError, LedgerPayload, LedgerTag, MemoryLedger, MemoryLedgerError};
use crate::proof::{Epoch, ProofResponse, StorageNode, Verifier};

/// A verifier and a set of named storage nodes sharing one ledger
///
/// Every node is enrolled with the chunk it is given, so by default all of
/// them are honest. Use [`TestNetwork::add_node_holding`] to enroll a node
/// that actually stores something else.
pub struct TestNetwork<L: Ledger = MemoryLedger> {
    pub verifier: Verifier<L>,
    nodes: HashMap<String, StorageNode>,
}

impl TestNetwork<MemoryLedger> {
    pub fn new(seed: &str) -> Self {
        Self::with_ledger(seed, MemoryLedger::new())
    }
}

impl<L: Ledger> TestNetwork<L> {
    pub fn with_ledger(seed: &str, ledger: L) -> Self {
        Self {
            verifier: Verifier::new(seed, ledger),
            nodes: HashMap::new(),
        }
    }

    /// Add an honest node storing `chunk`
    pub fn add_node(&mut self, name: &str, chunk: &str) -> NodeAddress {
        self.add_node_holding(name, chunk, chunk)
    }

    /// Add a node the verifier expects to hold `expected`, but which stores
    /// `stored`
    ///
    /// Keys come from the shared pool, so only the first `POOL_SIZE` nodes
    /// get distinct addresses.
    pub fn add_node_holding(&mut self, name: &str, expected: &str, stored: &str) -> NodeAddress {
        let key = pooled_key(self.nodes.len()).clone();
        let node = StorageNode::new(key, stored);
        let address = self.verifier.enroll(node.public_key().clone(), expected);
        self.nodes.insert(name.to_string(), node);
        address
    }

    pub fn node(&self, name: &str) -> Option<&StorageNode> {
        self.nodes.get(name)
    }

    /// Advance the verifier and publish the new epoch's challenges
    pub async fn open_epoch(&mut self) -> Epoch {
        let epoch = self.verifier.advance_epoch();
        self.verifier.publish_challenges().await;
        epoch
    }

    /// Have every node answer its challenge for `epoch`
    pub async fn respond_all(&self, epoch: Epoch) -> HashMap<String, Option<ProofResponse>> {
        let mut responses = HashMap::new();
        for (name, node) in &self.nodes {
            let response = match node.respond(self.verifier.ledger(), epoch).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(node = %name, "respond failed: {}", e);
                    None
                }
            };
            responses.insert(name.clone(), response);
        }
        responses
    }
}

/// A [`MemoryLedger`] that fails every call touching selected addresses
#[derive(Debug, Clone, Default)]
pub struct FaultyLedger {
    inner: MemoryLedger,
    broken: Arc<RwLock<HashSet<NodeAddress>>>,
}

impl FaultyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryLedger {
        &self.inner
    }

    pub fn break_address(&self, address: NodeAddress) {
        if let Ok(mut broken) = self.broken.write() {
            broken.insert(address);
        }
    }

    pub fn repair_address(&self, address: &NodeAddress) {
        if let Ok(mut broken) = self.broken.write() {
            broken.remove(address);
        }
    }

    fn check(&self, tag: &LedgerTag) -> Result<(), LedgerError<MemoryLedgerError>> {
        let broken = self.broken.read().map_err(|e| {
            LedgerError::Provider(MemoryLedgerError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })?;
        if broken.contains(&tag.address) {
            return Err(LedgerError::Provider(MemoryLedgerError::Internal(format!(
                "injected failure for {}",
                tag
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for FaultyLedger {
    type Error = MemoryLedgerError;

    async fn publish(
        &self,
        tag: LedgerTag,
        payload: LedgerPayload,
    ) -> Result<(), LedgerError<Self::Error>> {
        self.check(&tag)?;
        self.inner.publish(tag, payload).await
    }

    async fn query(
        &self,
        tag: &LedgerTag,
    ) -> Result<Option<LedgerPayload>, LedgerError<Self::Error>> {
        self.check(tag)?;
        self.inner.query(tag).await
    }
}
