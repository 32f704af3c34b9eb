//! shortcutd - background daemon for pinning home-screen shortcuts
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use shortcutd_service::{ServiceConfig, ShortcutService};

/// Background daemon that queues and pins home-screen shortcuts one at a time
#[derive(Parser, Debug)]
#[command(name = "shortcutd")]
#[command(about = "Queues shortcut requests and pins them one at a time", long_about = None)]
struct Args {
    /// Port the control channel listens on (overrides config)
    #[arg(long, value_name = "PORT")]
    bind_port: Option<u16>,

    /// Port results are sent back to (overrides config)
    #[arg(long, value_name = "PORT")]
    reply_port: Option<u16>,

    /// Path to a config file (default: <config_dir>/shortcutd/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the desktop-entry backend writes launchers into
    #[arg(long, value_name = "DIR")]
    pin_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    shortcutd_core::logging::init()?;

    let mut config = ServiceConfig::load_or_default(args.config.as_deref());
    if let Some(port) = args.bind_port {
        config.bind_port = port;
    }
    if let Some(port) = args.reply_port {
        config.reply_port = port;
    }
    if let Some(dir) = args.pin_dir {
        config.pin_dir = Some(dir);
    }

    info!(
        bind_port = config.bind_port,
        reply_port = config.reply_port,
        idle_timeout_secs = config.idle_timeout_secs,
        "starting service"
    );
    ShortcutService::new(config).run().await?;
    Ok(())
}
