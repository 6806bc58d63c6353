use std::fmt;

use serde::{Deserialize, Serialize};

use super::ProtocolError;
use crate::crypto::Digest;

/// Why a node failed an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// No proof arrived before the deadline
    Missing,
    /// The proof does not match the chunk and challenge
    DigestMismatch,
    /// The proof matches but its signature does not verify
    BadSignature,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Missing => f.write_str("missing"),
            Rejection::DigestMismatch => f.write_str("digest mismatch"),
            Rejection::BadSignature => f.write_str("bad signature"),
        }
    }
}

/// Per node, per epoch progress
///
/// ```text
/// EpochAdvanced -> SaltDerived -> ChallengePublished -> ProofComputed -> ProofVerified
///       |               |                 |                   |
///       |               |                 |                   +-> ProofRejected(DigestMismatch | BadSignature)
///       +---------------+-----------------+-> ProofRejected(Missing)
/// ```
///
/// Any session without a proof is rejected as missing once the deadline
/// passes, including one whose challenge never made it to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ProofState {
    EpochAdvanced,
    SaltDerived,
    ChallengePublished,
    ProofComputed,
    ProofVerified,
    ProofRejected(Rejection),
}

impl ProofState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProofState::ProofVerified | ProofState::ProofRejected(_))
    }

    /// Whether `self -> next` is a legal step
    pub fn can_transition(&self, next: &ProofState) -> bool {
        use ProofState::*;
        matches!(
            (self, next),
            (EpochAdvanced, SaltDerived)
                | (SaltDerived, ChallengePublished)
                | (ChallengePublished, ProofComputed)
                | (
                    EpochAdvanced | SaltDerived | ChallengePublished,
                    ProofRejected(Rejection::Missing)
                )
                | (ProofComputed, ProofVerified)
                | (
                    ProofComputed,
                    ProofRejected(Rejection::DigestMismatch | Rejection::BadSignature)
                )
        )
    }
}

impl fmt::Display for ProofState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofState::EpochAdvanced => f.write_str("epoch advanced"),
            ProofState::SaltDerived => f.write_str("salt derived"),
            ProofState::ChallengePublished => f.write_str("challenge published"),
            ProofState::ProofComputed => f.write_str("proof computed"),
            ProofState::ProofVerified => f.write_str("proof verified"),
            ProofState::ProofRejected(reason) => write!(f, "proof rejected ({})", reason),
        }
    }
}

/// State of one node for the current epoch, plus the challenge derived for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofSession {
    state: ProofState,
    mixed_salt: Option<Digest>,
}

impl Default for ProofSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofSession {
    pub fn new() -> Self {
        Self {
            state: ProofState::EpochAdvanced,
            mixed_salt: None,
        }
    }

    pub fn state(&self) -> ProofState {
        self.state
    }

    pub fn mixed_salt(&self) -> Option<&Digest> {
        self.mixed_salt.as_ref()
    }

    /// Drop everything from the previous epoch
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record the challenge for this epoch
    pub fn derive_salt(&mut self, mixed_salt: Digest) -> Result<(), ProtocolError> {
        self.transition(ProofState::SaltDerived)?;
        self.mixed_salt = Some(mixed_salt);
        Ok(())
    }

    pub fn transition(&mut self, next: ProofState) -> Result<(), ProtocolError> {
        if !self.state.can_transition(&next) {
            return Err(ProtocolError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
