use clap::Args;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Seed the verifier derives temporal salts from
    #[arg(long)]
    pub seed: Option<String>,

    /// RSA modulus size for the node key
    #[arg(long)]
    pub key_bits: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            seed: self.seed.clone().unwrap_or(defaults.seed),
            key_bits: self.key_bits.unwrap_or(defaults.key_bits),
            log_level: defaults.log_level,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let address = state.load_key()?.public().address();

        Ok(format!(
            "Initialized entangle directory at: {}\n\
             - Key: {}\n\
             - Config: {}\n\
             - Address: {}\n\
             - Seed: {}",
            state.entangle_dir.display(),
            state.key_path.display(),
            state.config_path.display(),
            address,
            state.config.seed,
        ))
    }
}
