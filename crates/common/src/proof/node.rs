use serde::{Deserialize, Serialize};

use super::chain::{compute_proof, proof_message, Epoch};
use super::ProtocolError;
use crate::crypto::{Digest, NodeAddress, ProofSignature, PublicKey, SecretKey};
use crate::ledger::{Ledger, LedgerError, LedgerPayload, LedgerTag};

#[derive(Debug, thiserror::Error)]
pub enum RespondError<T> {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError<T>),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// What a node published for one epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResponse {
    pub epoch: Epoch,
    pub mixed_salt: Digest,
    pub proof: Digest,
    pub signature: ProofSignature,
}

/// A storage node holding one chunk
///
/// The node never needs the seed or the epoch's temporal salt; its challenge
/// arrives through the ledger already mixed with its public key.
#[derive(Debug, Clone)]
pub struct StorageNode {
    key: SecretKey,
    chunk: Vec<u8>,
}

impl StorageNode {
    pub fn new(key: SecretKey, chunk: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            chunk: chunk.into(),
        }
    }

    pub fn address(&self) -> NodeAddress {
        self.key.public().address()
    }

    pub fn public_key(&self) -> &PublicKey {
        self.key.public()
    }

    pub fn chunk(&self) -> &[u8] {
        &self.chunk
    }

    /// Compute and sign the proof for `mixed_salt`
    pub fn prove(&self, mixed_salt: &Digest) -> Result<(Digest, ProofSignature), ProtocolError> {
        let proof = compute_proof(&self.chunk, mixed_salt);
        let signature = self
            .key
            .sign(proof_message(&proof).as_bytes())
            .ok_or_else(|| ProtocolError::SigningFailed(self.address()))?;
        Ok((proof, signature))
    }

    /// Answer this node's challenge for `epoch`, if one has been published
    ///
    /// # Returns
    /// * `Ok(Some(response))` - the proof was computed, signed and published
    /// * `Ok(None)` - no challenge for this node and epoch yet
    pub async fn respond<L: Ledger>(
        &self,
        ledger: &L,
        epoch: Epoch,
    ) -> Result<Option<ProofResponse>, RespondError<L::Error>> {
        let address = self.address();
        let challenge = ledger.query(&LedgerTag::challenge(address, epoch)).await?;

        let mixed_salt = match challenge {
            Some(LedgerPayload::Challenge { mixed_salt }) => mixed_salt,
            Some(other) => {
                tracing::warn!(%address, %epoch, kind = %other.kind(), "unexpected payload under challenge tag");
                return Ok(None);
            }
            None => {
                tracing::debug!(%address, %epoch, "no challenge published yet");
                return Ok(None);
            }
        };

        let (proof, signature) = self.prove(&mixed_salt)?;
        ledger
            .publish(
                LedgerTag::proof(address, epoch),
                LedgerPayload::Proof {
                    proof,
                    signature: signature.clone(),
                },
            )
            .await?;
        tracing::info!(%address, %epoch, %proof, "published proof");

        Ok(Some(ProofResponse {
            epoch,
            mixed_salt,
            proof,
            signature,
        }))
    }
}
