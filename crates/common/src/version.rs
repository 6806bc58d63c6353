use std::fmt;

use serde::Serialize;

/// Build metadata exported by the binary's build script
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_features: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
    pub target: &'static str,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {} ({})", self.version, self.repo_version)?;
        writeln!(f, "profile: {}", self.build_profile)?;
        writeln!(f, "features: {}", self.build_features)?;
        writeln!(f, "built: {}", self.build_timestamp)?;
        writeln!(f, "rustc: {}", self.rust_version)?;
        write!(f, "target: {}", self.target)
    }
}

/// Capture build information of the crate that invokes it
///
/// `env!` resolves in the calling crate, so a binary with a build script
/// reports its own values. Anything the build script did not export reads
/// as "unknown".
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            repo_version: option_env!("REPO_VERSION").unwrap_or("unknown"),
            build_profile: option_env!("BUILD_PROFILE").unwrap_or("unknown"),
            build_features: option_env!("BUILD_FEATURES").unwrap_or("unknown"),
            build_timestamp: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
            target: option_env!("BUILD_TARGET").unwrap_or("unknown"),
        }
    };
}

/// Build information of this library
pub fn build_info() -> BuildInfo {
    crate::build_info!()
}
