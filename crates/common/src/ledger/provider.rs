use std::fmt::{self, Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crypto::{Digest, NodeAddress, ProofSignature};
use crate::proof::Epoch;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError<T> {
    #[error("unhandled ledger provider error: {0}")]
    Provider(#[from] T),
    /// The payload does not belong under the tag it was published with
    #[error("payload of kind {payload} published under a {tag} tag")]
    KindMismatch { tag: EntryKind, payload: EntryKind },
}

/// What a ledger entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Mixed salt published by the verifier
    Challenge,
    /// Signed proof published by a storage node
    Proof,
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Challenge => f.write_str("challenge"),
            EntryKind::Proof => f.write_str("proof"),
        }
    }
}

/// Address of a ledger entry, rendered `<address>:<epoch>:<kind>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerTag {
    pub address: NodeAddress,
    pub epoch: Epoch,
    pub kind: EntryKind,
}

impl LedgerTag {
    pub fn challenge(address: NodeAddress, epoch: Epoch) -> Self {
        Self {
            address,
            epoch,
            kind: EntryKind::Challenge,
        }
    }

    pub fn proof(address: NodeAddress, epoch: Epoch) -> Self {
        Self {
            address,
            epoch,
            kind: EntryKind::Proof,
        }
    }
}

impl Display for LedgerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.address, self.epoch, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerPayload {
    Challenge {
        mixed_salt: Digest,
    },
    Proof {
        proof: Digest,
        signature: ProofSignature,
    },
}

impl LedgerPayload {
    pub fn kind(&self) -> EntryKind {
        match self {
            LedgerPayload::Challenge { .. } => EntryKind::Challenge,
            LedgerPayload::Proof { .. } => EntryKind::Proof,
        }
    }
}

/// Shared bulletin board between the verifier and storage nodes
///
/// Implementations only need to store and return payloads by tag. Nothing
/// is ever signed or checked here; the protocol layers do that.
#[async_trait]
pub trait Ledger: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Publish `payload` under `tag`
    ///
    /// A later publish under the same tag replaces the earlier one.
    ///
    /// # Errors
    /// * `LedgerError::KindMismatch` - the payload kind differs from the tag kind
    async fn publish(
        &self,
        tag: LedgerTag,
        payload: LedgerPayload,
    ) -> Result<(), LedgerError<Self::Error>>;

    /// Look up the payload stored under `tag`
    ///
    /// # Returns
    /// * `Ok(Some(payload))` - the latest payload published under `tag`
    /// * `Ok(None)` - nothing has been published yet
    async fn query(&self, tag: &LedgerTag)
        -> Result<Option<LedgerPayload>, LedgerError<Self::Error>>;
}
