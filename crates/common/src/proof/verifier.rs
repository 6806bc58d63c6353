use std::collections::BTreeMap;

use futures::future::join_all;

use super::chain::{check_proof, mixed_salt, temporal_salt, Epoch};
use super::state::{ProofSession, ProofState, Rejection};
use super::ProtocolError;
use crate::crypto::{Digest, NodeAddress, PublicKey};
use crate::ledger::{Ledger, LedgerPayload, LedgerTag};

#[derive(Debug, Clone)]
struct Enrollment {
    public_key: PublicKey,
    chunk: Vec<u8>,
    session: ProofSession,
}

/// The data owner's side of the protocol
///
/// Holds the shared seed, the current epoch and, for every enrolled node,
/// the node's public key, a copy of the chunk the node should be storing and
/// the node's session for the current epoch.
#[derive(Debug)]
pub struct Verifier<L: Ledger> {
    seed: String,
    epoch: Epoch,
    temporal_salt: Digest,
    ledger: L,
    nodes: BTreeMap<NodeAddress, Enrollment>,
}

impl<L: Ledger> Verifier<L> {
    /// Start at epoch zero; call `advance_epoch` to open the first round
    pub fn new(seed: impl Into<String>, ledger: L) -> Self {
        let seed = seed.into();
        let epoch = Epoch::default();
        Self {
            temporal_salt: temporal_salt(&seed, epoch),
            seed,
            epoch,
            ledger,
            nodes: BTreeMap::new(),
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn temporal_salt(&self) -> &Digest {
        &self.temporal_salt
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Start tracking `public_key` as the holder of `chunk`
    ///
    /// Enrolling an address again replaces its key, chunk and session.
    pub fn enroll(&mut self, public_key: PublicKey, chunk: impl Into<Vec<u8>>) -> NodeAddress {
        let address = public_key.address();
        self.nodes.insert(
            address,
            Enrollment {
                public_key,
                chunk: chunk.into(),
                session: ProofSession::new(),
            },
        );
        tracing::debug!(%address, "enrolled node");
        address
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeAddress> {
        self.nodes.keys()
    }

    pub fn state(&self, address: &NodeAddress) -> Result<ProofState, ProtocolError> {
        self.nodes
            .get(address)
            .map(|node| node.session.state())
            .ok_or(ProtocolError::UnknownNode(*address))
    }

    /// Current state of every enrolled node
    pub fn states(&self) -> BTreeMap<NodeAddress, ProofState> {
        self.nodes
            .iter()
            .map(|(address, node)| (*address, node.session.state()))
            .collect()
    }

    /// Open the next round
    ///
    /// Every session goes back to `EpochAdvanced`; whatever was pending for
    /// the previous epoch is dropped.
    pub fn advance_epoch(&mut self) -> Epoch {
        self.epoch = self.epoch.next();
        self.temporal_salt = temporal_salt(&self.seed, self.epoch);
        for node in self.nodes.values_mut() {
            node.session.reset();
        }
        tracing::info!(epoch = %self.epoch, temporal_salt = %self.temporal_salt, "advanced epoch");
        self.epoch
    }

    /// Derive and publish every pending node's challenge
    ///
    /// Nodes whose challenge is already out are skipped. A failed publish is
    /// logged and leaves the node at `SaltDerived`, so calling this again
    /// retries it. Returns how many challenges were published.
    pub async fn publish_challenges(&mut self) -> usize {
        let epoch = self.epoch;
        let mut pending = Vec::new();

        for (address, node) in self.nodes.iter_mut() {
            if node.session.state() == ProofState::EpochAdvanced {
                let salt = mixed_salt(&self.temporal_salt, &node.public_key);
                if let Err(e) = node.session.derive_salt(salt) {
                    tracing::warn!(%address, "failed to derive salt: {}", e);
                    continue;
                }
            }
            if node.session.state() != ProofState::SaltDerived {
                continue;
            }
            if let Some(salt) = node.session.mixed_salt() {
                pending.push((*address, *salt));
            }
        }

        let ledger = &self.ledger;
        let results = join_all(pending.into_iter().map(|(address, salt)| async move {
            let result = ledger
                .publish(
                    LedgerTag::challenge(address, epoch),
                    LedgerPayload::Challenge { mixed_salt: salt },
                )
                .await;
            (address, result)
        }))
        .await;

        let mut published = 0;
        for (address, result) in results {
            match result {
                Ok(()) => {
                    let Some(node) = self.nodes.get_mut(&address) else {
                        continue;
                    };
                    match node.session.transition(ProofState::ChallengePublished) {
                        Ok(()) => published += 1,
                        Err(e) => tracing::warn!(%address, "{}", e),
                    }
                }
                Err(e) => {
                    tracing::warn!(%address, %epoch, "failed to publish challenge: {}", e);
                }
            }
        }

        tracing::info!(%epoch, published, "published challenges");
        published
    }

    /// Collect and judge proofs for every node still waiting on one
    ///
    /// Lookups run concurrently. A node without a proof stays where it is
    /// until `deadline_reached`; then every node still short of a verdict is
    /// rejected as missing, including nodes whose challenge was never
    /// published. Ledger errors for one node are logged and count as "no
    /// proof yet"; they never stop the others from being evaluated.
    pub async fn evaluate(&mut self, deadline_reached: bool) -> BTreeMap<NodeAddress, ProofState> {
        let epoch = self.epoch;
        let ledger = &self.ledger;

        let waiting = self
            .nodes
            .iter()
            .filter(|(_, node)| node.session.state() == ProofState::ChallengePublished);

        let verdicts = join_all(waiting.map(|(address, node)| async move {
            let verdict = match ledger.query(&LedgerTag::proof(*address, epoch)).await {
                Ok(Some(LedgerPayload::Proof { proof, signature })) => {
                    match node.session.mixed_salt() {
                        Some(salt) => Some(check_proof(
                            &node.chunk,
                            salt,
                            &proof,
                            &signature,
                            &node.public_key,
                        )),
                        None => {
                            tracing::warn!(%address, "published challenge without a salt");
                            None
                        }
                    }
                }
                Ok(Some(other)) => {
                    tracing::warn!(%address, %epoch, kind = %other.kind(), "unexpected payload under proof tag");
                    None
                }
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(%address, %epoch, "failed to query proof: {}", e);
                    None
                }
            };
            (*address, verdict)
        }))
        .await;

        for (address, verdict) in verdicts {
            let Some(node) = self.nodes.get_mut(&address) else {
                continue;
            };
            if let Err(e) = apply_verdict(&mut node.session, verdict, deadline_reached) {
                tracing::warn!(%address, "{}", e);
            }
            match node.session.state() {
                ProofState::ProofVerified => tracing::info!(%address, %epoch, "proof verified"),
                ProofState::ProofRejected(reason) => {
                    tracing::warn!(%address, %epoch, %reason, "proof rejected")
                }
                _ => tracing::debug!(%address, %epoch, "proof pending"),
            }
        }

        if deadline_reached {
            for (address, node) in self.nodes.iter_mut() {
                if node.session.state().is_terminal() {
                    continue;
                }
                let from = node.session.state();
                match node
                    .session
                    .transition(ProofState::ProofRejected(Rejection::Missing))
                {
                    Ok(()) => tracing::warn!(%address, %epoch, %from, "no proof by deadline"),
                    Err(e) => tracing::warn!(%address, "{}", e),
                }
            }
        }

        self.states()
    }
}

fn apply_verdict(
    session: &mut ProofSession,
    verdict: Option<Result<(), Rejection>>,
    deadline_reached: bool,
) -> Result<(), ProtocolError> {
    match verdict {
        None if deadline_reached => {
            session.transition(ProofState::ProofRejected(Rejection::Missing))
        }
        None => Ok(()),
        Some(outcome) => {
            session.transition(ProofState::ProofComputed)?;
            match outcome {
                Ok(()) => session.transition(ProofState::ProofVerified),
                Err(reason) => session.transition(ProofState::ProofRejected(reason)),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::proof::StorageNode;
    use crate::testkit::{other_test_key, test_key};

    const SEED: &str = "myHandle";
    const CHUNK: &str = "0x1337EncryptedChunk";

    fn verifier() -> Verifier<MemoryLedger> {
        Verifier::new(SEED, MemoryLedger::new())
    }

    #[test]
    fn test_advance_epoch() {
        let mut verifier = verifier();
        assert_eq!(verifier.epoch(), Epoch::new(0));

        assert_eq!(verifier.advance_epoch(), Epoch::new(1));
        assert_eq!(verifier.temporal_salt(), &temporal_salt(SEED, Epoch::new(1)));
    }

    #[test]
    fn test_unknown_node() {
        let verifier = verifier();
        let address = test_key().public().address();
        assert_eq!(
            verifier.state(&address),
            Err(ProtocolError::UnknownNode(address))
        );
    }

    #[tokio::test]
    async fn test_publish_challenges() {
        let mut verifier = verifier();
        let address = verifier.enroll(test_key().public().clone(), CHUNK);
        let epoch = verifier.advance_epoch();

        assert_eq!(verifier.publish_challenges().await, 1);
        assert_eq!(verifier.state(&address), Ok(ProofState::ChallengePublished));

        let expected = mixed_salt(verifier.temporal_salt(), test_key().public());
        let published = verifier
            .ledger()
            .query(&LedgerTag::challenge(address, epoch))
            .await
            .unwrap();
        assert_eq!(
            published,
            Some(LedgerPayload::Challenge {
                mixed_salt: expected
            })
        );

        // nothing left to publish
        assert_eq!(verifier.publish_challenges().await, 0);
    }

    #[tokio::test]
    async fn test_evaluate_verifies_and_rejects() {
        let mut verifier = verifier();
        let honest = StorageNode::new(test_key().clone(), CHUNK);
        let lazy = StorageNode::new(other_test_key().clone(), "not the chunk");
        verifier.enroll(honest.public_key().clone(), CHUNK);
        verifier.enroll(lazy.public_key().clone(), CHUNK);

        let epoch = verifier.advance_epoch();
        verifier.publish_challenges().await;
        honest.respond(verifier.ledger(), epoch).await.unwrap();
        lazy.respond(verifier.ledger(), epoch).await.unwrap();

        let states = verifier.evaluate(false).await;
        assert_eq!(states[&honest.address()], ProofState::ProofVerified);
        assert_eq!(
            states[&lazy.address()],
            ProofState::ProofRejected(Rejection::DigestMismatch)
        );
    }

    #[tokio::test]
    async fn test_missing_proof_waits_for_deadline() {
        let mut verifier = verifier();
        let address = verifier.enroll(test_key().public().clone(), CHUNK);
        verifier.advance_epoch();
        verifier.publish_challenges().await;

        let states = verifier.evaluate(false).await;
        assert_eq!(states[&address], ProofState::ChallengePublished);

        let states = verifier.evaluate(true).await;
        assert_eq!(
            states[&address],
            ProofState::ProofRejected(Rejection::Missing)
        );
    }

    #[tokio::test]
    async fn test_deadline_settles_unchallenged_nodes() {
        let mut verifier = verifier();
        let published = verifier.enroll(test_key().public().clone(), CHUNK);
        verifier.advance_epoch();
        verifier.publish_challenges().await;
        let late = verifier.enroll(other_test_key().public().clone(), CHUNK);
        assert_eq!(verifier.state(&late), Ok(ProofState::EpochAdvanced));

        let states = verifier.evaluate(true).await;
        for address in [published, late] {
            assert_eq!(
                states[&address],
                ProofState::ProofRejected(Rejection::Missing)
            );
            assert!(states[&address].is_terminal());
        }
    }

    #[tokio::test]
    async fn test_advance_discards_pending_state() {
        let mut verifier = verifier();
        let address = verifier.enroll(test_key().public().clone(), CHUNK);
        verifier.advance_epoch();
        verifier.publish_challenges().await;
        verifier.evaluate(true).await;

        verifier.advance_epoch();
        assert_eq!(verifier.state(&address), Ok(ProofState::EpochAdvanced));
    }

    #[test]
    fn test_apply_verdict() {
        let published = || {
            let mut session = ProofSession::new();
            session.derive_salt(Digest::of("salt")).unwrap();
            session.transition(ProofState::ChallengePublished).unwrap();
            session
        };

        let mut session = published();
        apply_verdict(&mut session, Some(Err(Rejection::BadSignature)), false).unwrap();
        assert_eq!(
            session.state(),
            ProofState::ProofRejected(Rejection::BadSignature)
        );

        let mut session = published();
        apply_verdict(&mut session, Some(Ok(())), true).unwrap();
        assert_eq!(session.state(), ProofState::ProofVerified);
    }
}
