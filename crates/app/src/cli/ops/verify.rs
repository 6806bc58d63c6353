use std::path::PathBuf;

use clap::Args;
use common::crypto::{Digest, DigestError, ProofSignature, SignatureError};
use common::proof::{check_proof, mixed_salt, temporal_salt, Epoch, Rejection};

use super::salt::{read_public_key, SaltError};
use crate::cli::op::{Op, OpContext};
use crate::state::StateError;

/// Check a node's proof for an epoch against our copy of the chunk
#[derive(Args, Debug, Clone)]
pub struct Verify {
    #[arg(long)]
    pub epoch: u64,

    /// PEM file with the node's public key
    #[arg(long)]
    pub public_key: PathBuf,

    /// File holding the chunk the node should store
    #[arg(long)]
    pub chunk: PathBuf,

    /// Hex proof published by the node
    #[arg(long)]
    pub proof: String,

    /// Hex signature over the proof
    #[arg(long)]
    pub signature: String,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    PublicKey(#[from] SaltError),
    #[error("invalid proof: {0}")]
    Proof(#[from] DigestError),
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),
    #[error("failed to read chunk {path}: {source}")]
    Chunk {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("proof rejected: {0}")]
    Rejected(Rejection),
}

#[async_trait::async_trait]
impl Op for Verify {
    type Error = VerifyError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let public_key = read_public_key(&self.public_key)?;
        let proof = Digest::from_hex(&self.proof)?;
        let signature = ProofSignature::from_hex(&self.signature)?;
        let chunk = tokio::fs::read(&self.chunk)
            .await
            .map_err(|source| VerifyError::Chunk {
                path: self.chunk.clone(),
                source,
            })?;

        let epoch = Epoch::new(self.epoch);
        let mixed = mixed_salt(&temporal_salt(&state.config.seed, epoch), &public_key);
        check_proof(&chunk, &mixed, &proof, &signature, &public_key)
            .map_err(VerifyError::Rejected)?;

        Ok(format!(
            "proof verified for {} at epoch {}",
            public_key.address(),
            epoch
        ))
    }
}
