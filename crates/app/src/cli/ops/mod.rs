pub mod demo;
pub mod init;
pub mod key;
pub mod prove;
pub mod salt;
pub mod verify;
pub mod version;

pub use demo::Demo;
pub use init::Init;
pub use key::Key;
pub use prove::Prove;
pub use salt::Salt;
pub use verify::Verify;
pub use version::Version;
