use std::path::PathBuf;

use clap::Args;
use common::crypto::{Digest, DigestError};
use common::proof::{ProtocolError, StorageNode};

use crate::cli::op::{Op, OpContext};
use crate::state::StateError;

/// Answer a challenge for a chunk stored on disk
#[derive(Args, Debug, Clone)]
pub struct Prove {
    /// Hex mixed salt published for this node
    #[arg(long)]
    pub mixed_salt: String,

    /// File holding the chunk
    #[arg(long)]
    pub chunk: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ProveError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid mixed salt: {0}")]
    Salt(#[from] DigestError),
    #[error("failed to read chunk {path}: {source}")]
    Chunk {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[async_trait::async_trait]
impl Op for Prove {
    type Error = ProveError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let key = ctx.state()?.load_key()?;
        let mixed_salt = Digest::from_hex(&self.mixed_salt)?;
        let chunk = tokio::fs::read(&self.chunk)
            .await
            .map_err(|source| ProveError::Chunk {
                path: self.chunk.clone(),
                source,
            })?;

        let node = StorageNode::new(key, chunk);
        let (proof, signature) = node.prove(&mixed_salt)?;

        Ok(format!("proof: {}\nsignature: {}", proof, signature.to_hex()))
    }
}
