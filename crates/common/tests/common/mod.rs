//! Shared helpers for protocol integration tests
#![allow(dead_code)]

use ::common::prelude::*;
use ::common::testkit::TestNetwork;

pub const SEED: &str = "myHandle";
pub const CHUNK: &str = "0x1337EncryptedChunk";

/// Install a test subscriber so `RUST_LOG=debug cargo test` shows protocol logs
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two honest nodes, alice and bob, both holding `CHUNK`
pub fn two_node_network() -> (TestNetwork, NodeAddress, NodeAddress) {
    init_tracing();
    let mut net = TestNetwork::new(SEED);
    let alice = net.add_node("alice", CHUNK);
    let bob = net.add_node("bob", CHUNK);
    (net, alice, bob)
}
