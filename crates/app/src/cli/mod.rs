pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Demo, Init, Key, Prove, Salt, Verify, Version};
