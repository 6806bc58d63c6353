use std::path::{Path, PathBuf};

use clap::Args;
use common::crypto::PublicKey;
use common::proof::{mixed_salt, temporal_salt, Epoch};

use crate::cli::op::{Op, OpContext};
use crate::state::StateError;

/// Derive the challenge a node gets for an epoch
#[derive(Args, Debug, Clone)]
pub struct Salt {
    #[arg(long)]
    pub epoch: u64,

    /// PEM file with the node's public key (defaults to our own key)
    #[arg(long)]
    pub public_key: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum SaltError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid public key: {0}")]
    Key(#[from] common::crypto::KeyError),
}

/// Read a public key from `path`
pub fn read_public_key(path: &Path) -> Result<PublicKey, SaltError> {
    let pem = std::fs::read_to_string(path).map_err(|source| SaltError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PublicKey::from_pem(&pem)?)
}

#[async_trait::async_trait]
impl Op for Salt {
    type Error = SaltError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let public_key = match &self.public_key {
            Some(path) => read_public_key(path)?,
            None => state.load_key()?.public().clone(),
        };

        let epoch = Epoch::new(self.epoch);
        let temporal = temporal_salt(&state.config.seed, epoch);
        let mixed = mixed_salt(&temporal, &public_key);
        tracing::debug!(%epoch, address = %public_key.address(), "derived salts");

        Ok(format!(
            "epoch: {}\naddress: {}\ntemporal salt: {}\nmixed salt: {}",
            epoch,
            public_key.address(),
            temporal,
            mixed
        ))
    }
}
