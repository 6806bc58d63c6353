use clap::Args;

use crate::cli::op::{Op, OpContext};
use crate::state::StateError;

/// Print the node's public key and address
#[derive(Args, Debug, Clone)]
pub struct Key;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error(transparent)]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl Op for Key {
    type Error = KeyError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let key = ctx.state()?.load_key()?;
        let public = key.public();
        Ok(format!("address: {}\n{}", public.address(), public.to_pem().trim_end()))
    }
}
