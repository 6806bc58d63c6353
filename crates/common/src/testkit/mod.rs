//! Lightweight harness for protocol tests
//!
//! Generating RSA keys dominates test time, so a small pool of keys is
//! generated once per test binary and handed out by reference.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::TestNetwork;
//!
//! #[tokio::test]
//! async fn test_round() {
//!     let mut net = TestNetwork::new("myHandle");
//!     let alice = net.add_node("alice", "0x1337EncryptedChunk");
//!
//!     let epoch = net.open_epoch().await;
//!     net.respond_all(epoch).await;
//!
//!     let states = net.verifier.evaluate(true).await;
//!     assert_eq!(states[&alice], ProofState::ProofVerified);
//! }
//! ```

mod keys;
mod network;

pub use keys::{other_test_key, pooled_key, test_key, undersized_key, POOL_SIZE};
pub use network::{FaultyLedger, TestNetwork};
