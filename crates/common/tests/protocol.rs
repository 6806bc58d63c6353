//! End-to-end proof-of-storage rounds over the in-memory ledger

mod common;

use ::common::prelude::*;
use ::common::proof::check_proof;
use ::common::testkit::{FaultyLedger, TestNetwork};

use common::{two_node_network, CHUNK, SEED};

#[tokio::test]
async fn test_two_nodes_prove_storage() {
    let (mut net, alice, bob) = two_node_network();

    let epoch = net.open_epoch().await;
    assert_eq!(epoch, Epoch::new(1));

    let responses = net.respond_all(epoch).await;
    assert!(responses.values().all(Option::is_some));

    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&alice], ProofState::ProofVerified);
    assert_eq!(states[&bob], ProofState::ProofVerified);
}

#[tokio::test]
async fn test_proofs_fail_against_the_other_key() {
    let (mut net, _, _) = two_node_network();
    let epoch = net.open_epoch().await;
    let responses = net.respond_all(epoch).await;

    let alice = net.node("alice").unwrap();
    let bob = net.node("bob").unwrap();
    let alice_response = responses["alice"].clone().unwrap();
    let bob_response = responses["bob"].clone().unwrap();

    let temporal = temporal_salt(SEED, epoch);
    assert_eq!(
        alice_response.mixed_salt,
        mixed_salt(&temporal, alice.public_key())
    );

    for (response, own, other) in [
        (&alice_response, alice.public_key(), bob.public_key()),
        (&bob_response, bob.public_key(), alice.public_key()),
    ] {
        assert_eq!(
            check_proof(
                CHUNK,
                &response.mixed_salt,
                &response.proof,
                &response.signature,
                own
            ),
            Ok(())
        );
        assert_eq!(
            check_proof(
                CHUNK,
                &response.mixed_salt,
                &response.proof,
                &response.signature,
                other
            ),
            Err(Rejection::BadSignature)
        );
    }
}

#[tokio::test]
async fn test_node_without_the_chunk_is_rejected() {
    let mut net = TestNetwork::new(SEED);
    let honest = net.add_node("honest", CHUNK);
    let cheat = net.add_node_holding("cheat", CHUNK, "0xDeadbeef");

    let epoch = net.open_epoch().await;
    net.respond_all(epoch).await;

    let states = net.verifier.evaluate(true).await;
    assert_eq!(states[&honest], ProofState::ProofVerified);
    assert_eq!(
        states[&cheat],
        ProofState::ProofRejected(Rejection::DigestMismatch)
    );
}

#[tokio::test]
async fn test_missing_proof_is_pending_then_rejected() {
    let (mut net, alice, bob) = two_node_network();
    let epoch = net.open_epoch().await;

    // only alice answers
    net.node("alice")
        .unwrap()
        .respond(net.verifier.ledger(), epoch)
        .await
        .unwrap();

    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&alice], ProofState::ProofVerified);
    assert_eq!(states[&bob], ProofState::ChallengePublished);

    let states = net.verifier.evaluate(true).await;
    assert_eq!(states[&alice], ProofState::ProofVerified);
    assert_eq!(states[&bob], ProofState::ProofRejected(Rejection::Missing));
}

#[tokio::test]
async fn test_late_proof_before_deadline_is_accepted() {
    let (mut net, alice, _) = two_node_network();
    let epoch = net.open_epoch().await;

    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&alice], ProofState::ChallengePublished);

    net.respond_all(epoch).await;
    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&alice], ProofState::ProofVerified);
}

#[tokio::test]
async fn test_replayed_proof_is_rejected() {
    let (mut net, alice, _) = two_node_network();

    let first = net.open_epoch().await;
    let responses = net.respond_all(first).await;
    net.verifier.evaluate(true).await;
    let old = responses["alice"].clone().unwrap();

    // alice replays last epoch's answer instead of computing a new one
    let second = net.open_epoch().await;
    net.verifier
        .ledger()
        .publish(
            LedgerTag::proof(alice, second),
            LedgerPayload::Proof {
                proof: old.proof,
                signature: old.signature,
            },
        )
        .await
        .unwrap();

    let states = net.verifier.evaluate(true).await;
    assert_eq!(
        states[&alice],
        ProofState::ProofRejected(Rejection::DigestMismatch)
    );
}

#[tokio::test]
async fn test_answering_an_old_epoch_does_not_count() {
    let (mut net, alice, _) = two_node_network();

    let first = net.open_epoch().await;
    net.open_epoch().await;

    // responding to the stale epoch publishes under the stale tag
    net.respond_all(first).await;

    let states = net.verifier.evaluate(true).await;
    assert_eq!(states[&alice], ProofState::ProofRejected(Rejection::Missing));
}

#[tokio::test]
async fn test_ledger_failure_is_isolated() {
    common::init_tracing();
    let ledger = FaultyLedger::new();
    let mut net = TestNetwork::with_ledger(SEED, ledger.clone());
    let alice = net.add_node("alice", CHUNK);
    let bob = net.add_node("bob", CHUNK);

    let epoch = net.open_epoch().await;
    net.respond_all(epoch).await;

    ledger.break_address(bob);
    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&alice], ProofState::ProofVerified);
    assert_eq!(states[&bob], ProofState::ChallengePublished);

    ledger.repair_address(&bob);
    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&bob], ProofState::ProofVerified);
}

#[tokio::test]
async fn test_failed_challenge_publish_is_retried() {
    common::init_tracing();
    let ledger = FaultyLedger::new();
    let mut net = TestNetwork::with_ledger(SEED, ledger.clone());
    let alice = net.add_node("alice", CHUNK);

    ledger.break_address(alice);
    net.verifier.advance_epoch();
    assert_eq!(net.verifier.publish_challenges().await, 0);
    assert_eq!(net.verifier.state(&alice), Ok(ProofState::SaltDerived));

    ledger.repair_address(&alice);
    assert_eq!(net.verifier.publish_challenges().await, 1);
    assert_eq!(
        net.verifier.state(&alice),
        Ok(ProofState::ChallengePublished)
    );
}

#[tokio::test]
async fn test_unpublished_challenge_is_missing_after_deadline() {
    common::init_tracing();
    let ledger = FaultyLedger::new();
    let mut net = TestNetwork::with_ledger(SEED, ledger.clone());
    let alice = net.add_node("alice", CHUNK);
    let bob = net.add_node("bob", CHUNK);

    ledger.break_address(alice);
    let epoch = net.verifier.advance_epoch();
    assert_eq!(net.verifier.publish_challenges().await, 1);
    assert_eq!(net.verifier.state(&alice), Ok(ProofState::SaltDerived));
    let node = net.node("bob").unwrap();
    node.respond(net.verifier.ledger(), epoch).await.unwrap();

    let states = net.verifier.evaluate(false).await;
    assert_eq!(states[&alice], ProofState::SaltDerived);
    assert_eq!(states[&bob], ProofState::ProofVerified);

    let states = net.verifier.evaluate(true).await;
    assert_eq!(states[&alice], ProofState::ProofRejected(Rejection::Missing));
    assert!(states.values().all(ProofState::is_terminal));
}
