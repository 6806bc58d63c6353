mod memory;
mod provider;

pub use memory::{MemoryLedger, MemoryLedgerError};
pub use provider::{EntryKind, Ledger, LedgerError, LedgerPayload, LedgerTag};
