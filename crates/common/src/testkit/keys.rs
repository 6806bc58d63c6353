use std::sync::OnceLock;

use crate::crypto::{SecretKey, DEFAULT_KEY_BITS};

pub const POOL_SIZE: usize = 4;

static POOL: OnceLock<Vec<SecretKey>> = OnceLock::new();
static UNDERSIZED: OnceLock<SecretKey> = OnceLock::new();

/// The `index`th key of the shared pool, wrapping around
pub fn pooled_key(index: usize) -> &'static SecretKey {
    let pool = POOL.get_or_init(|| {
        (0..POOL_SIZE)
            .map(|_| SecretKey::generate(DEFAULT_KEY_BITS).expect("test key generation"))
            .collect()
    });
    &pool[index % POOL_SIZE]
}

pub fn test_key() -> &'static SecretKey {
    pooled_key(0)
}

pub fn other_test_key() -> &'static SecretKey {
    pooled_key(1)
}

/// A 384-bit key: encodes and parses fine, but too short to hold an
/// RSA-SHA256 PKCS#1 v1.5 signature, so signing with it always fails
pub fn undersized_key() -> &'static SecretKey {
    UNDERSIZED.get_or_init(|| SecretKey::generate(384).expect("undersized key generation"))
}
