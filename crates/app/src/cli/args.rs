pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "entangle")]
#[command(about = "Hash-chain proof of storage over RSA keys")]
pub struct Args {
    /// Path to the entangle state directory (defaults to ~/.entangle)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level; takes precedence over the config file, RUST_LOG over both
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "entangle",
            "salt",
            "--epoch",
            "3",
            "--config-path",
            "/tmp/entangle",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.config_path, Some(PathBuf::from("/tmp/entangle")));
        assert_eq!(args.log_level, Some(tracing::Level::DEBUG));
        assert!(matches!(args.command, crate::Command::Salt(_)));
    }

    #[test]
    fn test_verify_requires_all_inputs() {
        let result = Args::try_parse_from(["entangle", "verify", "--epoch", "1"]);
        assert!(result.is_err());
    }
}
