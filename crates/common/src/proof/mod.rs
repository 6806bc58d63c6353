//! Hash-chain proof of storage
//!
//! Every epoch the verifier folds a shared seed and the epoch number into a
//! temporal salt, mixes it with each node's public key and publishes the
//! result as that node's challenge. A node answers by hashing the chunk it
//! stores together with its challenge and signing the digest:
//!
//! ```text
//! temporal = SHA256(seed || decimal(epoch))
//! mixed    = SHA256(hex(temporal) || public key PEM)
//! proof    = SHA256(chunk || hex(mixed))
//! sig      = RSA-SHA256(hex(proof))
//! ```
//!
//! The verifier holds its own copy of each chunk, so it recomputes the whole
//! chain and compares. Because the mixed salt changes every epoch, a proof
//! from an earlier epoch never matches.

mod chain;
mod node;
mod state;
mod verifier;

pub use chain::{check_proof, compute_proof, mixed_salt, proof_message, temporal_salt, Epoch};
pub use node::{ProofResponse, RespondError, StorageNode};
pub use state::{ProofSession, ProofState, Rejection};
pub use verifier::Verifier;

use crate::crypto::NodeAddress;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("node {0} is not enrolled")]
    UnknownNode(NodeAddress),
    #[error("illegal proof state transition: {from} -> {to}")]
    IllegalTransition { from: ProofState, to: ProofState },
    #[error("node {0} could not sign its proof")]
    SigningFailed(NodeAddress),
}
