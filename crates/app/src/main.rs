mod cli;
mod logging;
mod state;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Demo, Init, Key, Prove, Salt, Verify, Version};

command_enum! {
    (Init, Init),
    (Key, Key),
    (Salt, Salt),
    (Prove, Prove),
    (Verify, Verify),
    (Demo, Demo),
    (Version, Version),
}

/// Flag first, then the config file, then warnings only
fn resolve_log_level(args: &Args) -> tracing::Level {
    if let Some(level) = args.log_level {
        return level;
    }
    state::AppState::load(args.config_path.clone())
        .ok()
        .and_then(|state| state.config.log_level().ok())
        .unwrap_or(tracing::Level::WARN)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let guard = logging::init_logging(resolve_log_level(&args));

    let ctx = cli::op::OpContext::new(args.config_path);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {}", e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
