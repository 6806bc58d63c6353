use std::fmt::Write;

use clap::Args;
use common::crypto::{KeyError, SecretKey, DEFAULT_KEY_BITS};
use common::ledger::{MemoryLedger, MemoryLedgerError};
use common::proof::{check_proof, ProofResponse, ProofState, RespondError, StorageNode, Verifier};

use crate::cli::op::{Op, OpContext};

const DEFAULT_SEED: &str = "myHandle";
const DEFAULT_CHUNK: &str = "0x1337EncryptedChunk";

/// Run full protocol rounds between a verifier and local nodes over an
/// in-memory ledger
#[derive(Args, Debug, Clone)]
pub struct Demo {
    /// Seed for temporal salts (defaults to the configured seed, then "myHandle")
    #[arg(long)]
    pub seed: Option<String>,

    /// Chunk every node stores
    #[arg(long, default_value = DEFAULT_CHUNK)]
    pub chunk: String,

    #[arg(long, default_value_t = 2)]
    pub nodes: usize,

    #[arg(long, default_value_t = 1)]
    pub epochs: u64,

    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    pub key_bits: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to generate node key: {0}")]
    Key(#[from] KeyError),
    #[error("node failed to respond: {0}")]
    Respond(#[from] RespondError<MemoryLedgerError>),
    #[error("demo needs at least one node")]
    NoNodes,
    #[error("output error: {0}")]
    Format(#[from] std::fmt::Error),
}

#[async_trait::async_trait]
impl Op for Demo {
    type Error = DemoError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        if self.nodes == 0 {
            return Err(DemoError::NoNodes);
        }

        let seed = match &self.seed {
            Some(seed) => seed.clone(),
            None => ctx
                .state()
                .map(|state| state.config.seed)
                .unwrap_or_else(|_| DEFAULT_SEED.to_string()),
        };

        let ledger = MemoryLedger::new();
        let mut verifier = Verifier::new(seed.clone(), ledger.clone());
        let mut nodes = Vec::with_capacity(self.nodes);
        for _ in 0..self.nodes {
            let node = StorageNode::new(SecretKey::generate(self.key_bits)?, self.chunk.as_bytes());
            verifier.enroll(node.public_key().clone(), self.chunk.as_bytes());
            nodes.push(node);
        }

        let mut out = String::new();
        writeln!(out, "seed: {}", seed)?;
        writeln!(out, "chunk: {}", self.chunk)?;
        for (index, node) in nodes.iter().enumerate() {
            writeln!(out, "node {}: {}", index, node.address())?;
        }

        let mut last_round = Vec::new();
        for _ in 0..self.epochs {
            let epoch = verifier.advance_epoch();
            verifier.publish_challenges().await;
            writeln!(out, "\nepoch {} (temporal salt {})", epoch, verifier.temporal_salt())?;

            last_round.clear();
            for node in &nodes {
                if let Some(response) = node.respond(&ledger, epoch).await? {
                    last_round.push((node, response));
                }
            }

            let states = verifier.evaluate(true).await;
            for (index, node) in nodes.iter().enumerate() {
                let state = states
                    .get(&node.address())
                    .copied()
                    .unwrap_or(ProofState::EpochAdvanced);
                writeln!(out, "  node {}: {}", index, state)?;
            }
        }

        if let [(first, first_response), (second, second_response), ..] = last_round.as_slice() {
            writeln!(out, "\ncross-key checks")?;
            write_cross_check(&mut out, "node 0 proof, node 1 key", first_response, second)?;
            write_cross_check(&mut out, "node 1 proof, node 0 key", second_response, first)?;
        }

        Ok(out.trim_end().to_string())
    }
}

fn write_cross_check(
    out: &mut String,
    label: &str,
    response: &ProofResponse,
    other: &StorageNode,
) -> Result<(), std::fmt::Error> {
    let outcome = check_proof(
        other.chunk(),
        &response.mixed_salt,
        &response.proof,
        &response.signature,
        other.public_key(),
    );
    match outcome {
        Ok(()) => writeln!(out, "  {}: accepted", label),
        Err(reason) => writeln!(out, "  {}: rejected ({})", label, reason),
    }
}
