use anyhow::Context;
use clap::Parser;
use confer_server::{ServerConfig, serve};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "confer-server", version, about = "Signaling relay for mesh conferences")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CONFER_ADDR", default_value = "0.0.0.0:5000")]
    addr: SocketAddr,

    /// TURN server url advertised to clients next to the default STUN servers
    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", requires = "turn_url")]
    turn_credential: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = ServerConfig::default().with_bind_addr(args.addr);
    if let Some(url) = args.turn_url {
        info!("Advertising TURN server {}", url);
        config = config.with_turn(url, args.turn_username, args.turn_credential);
    }

    serve(config).await.context("signaling server stopped")
}
