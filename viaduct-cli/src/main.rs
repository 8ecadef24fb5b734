use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use viaduct_client::{Negotiator, NegotiatorConfig};
use viaduct_core::RelayServer;
use viaduct_server::ServerConfig;

#[derive(Parser)]
#[command(name = "viaduct")]
#[command(about = "VNC-over-WebRTC tunnel: signaling server and probe client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server and bridge tunnels to an upstream VNC server.
    Serve {
        /// Address for the signaling HTTP endpoint.
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: SocketAddr,

        /// TCP address of the VNC server behind the tunnel.
        #[arg(long, default_value = "127.0.0.1:5900")]
        upstream: SocketAddr,

        /// Relay (STUN/TURN) server URL; repeatable. Defaults to the
        /// built-in STUN server.
        #[arg(long = "relay")]
        relays: Vec<String>,
    },

    /// Negotiate one tunnel against a signaling URL and report the outcome.
    Probe {
        /// Signaling endpoint, e.g. http://host:8080/sdp
        #[arg(long)]
        url: String,

        /// Relay (STUN/TURN) server URL; repeatable.
        #[arg(long = "relay")]
        relays: Vec<String>,
    },
}

fn relay_list(relays: Vec<String>) -> Option<Vec<RelayServer>> {
    if relays.is_empty() {
        None
    } else {
        Some(vec![RelayServer::new(relays)])
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            upstream,
            relays,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                upstream_addr: upstream,
                relay_servers: relay_list(relays)
                    .unwrap_or_else(|| vec![RelayServer::default_stun()]),
            };
            viaduct_server::serve(config).await
        }

        Commands::Probe { url, relays } => {
            println!("negotiating tunnel via {}...", url.bold());

            let negotiator = Negotiator::new(NegotiatorConfig::default());
            match negotiator.negotiate(&url, relay_list(relays)).await {
                Ok(channel) => {
                    println!(
                        "{} channel '{}' open",
                        "tunnel established:".green().bold(),
                        channel.label()
                    );
                    channel.close().await?;
                    Ok(())
                }
                Err(err) => {
                    println!("{} {err}", "negotiation failed:".red().bold());
                    std::process::exit(1);
                }
            }
        }
    }
}
