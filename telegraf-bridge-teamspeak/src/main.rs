//! Telegraf bridge for TeamSpeak 3.
//!
//! Polls a ServerQuery interface and writes virtual server statistics to a
//! Telegraf socket listener.

use anyhow::{Context, Result};
use clap::Parser;
use telegraf_bridge_teamspeak::config::{DEFAULT_CONFIG_PATH, Overrides, TeamspeakBridgeConfig};
use telegraf_bridge_teamspeak::error::CollectError;
use telegraf_bridge_teamspeak::poller::TeamspeakPoller;
use telegraf_bridge_teamspeak::query::{QuerySession, ServerQueryClient};
use tracing::info;
use tsmetrics_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};

/// Telegraf bridge for TeamSpeak 3 ServerQuery.
#[derive(Parser, Debug)]
#[command(name = "telegraf-bridge-teamspeak")]
#[command(about = "Polls TeamSpeak 3 virtual servers and writes to Telegraf")]
#[command(version)]
struct Args {
    #[command(flatten)]
    bridge: BridgeArgs,

    /// ServerQuery address (host:port)
    #[arg(long)]
    server: Option<String>,

    /// ServerQuery login name
    #[arg(long)]
    username: Option<String>,

    /// ServerQuery login password
    #[arg(long)]
    password: Option<String>,

    /// Telegraf endpoint: unix:<path>, tcp:<host:port> or udp:<host:port>
    #[arg(long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let source = args.bridge.config_source(DEFAULT_CONFIG_PATH);
    let mut config = TeamspeakBridgeConfig::load_from_source(&source)
        .with_context(|| format!("Failed to load config ({:?})", source))?;

    config.apply(Overrides {
        server: args.server,
        username: args.username,
        password: args.password,
        output: args.output,
    });
    config.validate().context("Invalid configuration")?;

    let mut runner = BridgeRunner::new_with_args("teamspeak", config, Some(&args.bridge))
        .await
        .context("Failed to start bridge")?;
    info!(source = ?source, "Loaded configuration");

    let ts = runner.config().teamspeak.clone();

    info!(server = %ts.server, "Connecting to ServerQuery...");
    let mut client = ServerQueryClient::connect(&ts.server, ts.timeout())
        .await
        .with_context(|| format!("Could not establish ServerQuery connection to {}", ts.server))?;

    client
        .login(&ts.username, &ts.password)
        .await
        .map_err(CollectError::Auth)
        .context("Authentication failure")?;
    info!(server = %ts.server, username = %ts.username, "Logged in to ServerQuery");

    let poller = TeamspeakPoller::new(client, runner.publisher(), &ts);
    runner.spawn_with_error("teamspeak-poller", poller.run());

    Ok(runner.run().await?)
}
