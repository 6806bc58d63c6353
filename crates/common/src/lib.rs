/**
 * Cryptographic types and operations.
 *  - Byte-exact RSA DER / PEM codec
 *  - SHA-256 digests
 *  - RSA-SHA256 signing and dual-path verification
 */
pub mod crypto;
/**
 * The bulletin board challenges and proofs are
 *  published to. Only the interface the protocol
 *  needs, plus an in-memory implementation.
 */
pub mod ledger;
/**
 * Hash-chain proof-of-storage: salts, proofs,
 *  and the verifier / storage node roles.
 */
pub mod proof;
/**
 * In-process harness for protocol tests.
 */
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{Digest, NodeAddress, ProofSignature, PublicKey, SecretKey};
    pub use crate::ledger::{EntryKind, Ledger, LedgerError, LedgerPayload, LedgerTag, MemoryLedger};
    pub use crate::proof::{
        compute_proof, mixed_salt, temporal_salt, Epoch, ProofState, ProtocolError, Rejection,
        StorageNode, Verifier,
    };
    pub use crate::version::{build_info, BuildInfo};
}
