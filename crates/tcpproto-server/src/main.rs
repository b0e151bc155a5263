//! tcpproto server binary.
//!
//! # Usage
//!
//! ```bash
//! tcpproto-server --bind 0.0.0.0:7878 --secret-key "change-me"
//! ```
//!
//! Registers a single `PING` command that echoes back `"PONG"`, as a
//! minimal demonstration; embedders are expected to link [`tcpproto_server`]
//! as a library and register their own callbacks instead of running this
//! binary directly.

use std::sync::Arc;

use clap::Parser;
use tcpproto_core::Configuration;
use tcpproto_crypto::client_vault;
use tcpproto_server::{Registry, Server};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// tcpproto protocol server
#[derive(Parser, Debug)]
#[command(name = "tcpproto-server")]
#[command(about = "tcpproto protocol server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:7878")]
    bind: String,

    /// Shared secret the server vault derives its AES-256-GCM key from
    #[arg(long, env = "TCPPROTO_SECRET_KEY")]
    secret_key: String,

    /// Path to a PKCS#8 PEM private key, for decrypting client-vault fields
    #[arg(long)]
    privkey: Option<String>,

    /// Disable vault/client-vault cryptography entirely
    #[arg(long)]
    no_crypto: bool,

    /// Maximum header size in bytes (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_header_size: usize,

    /// Maximum body size in bytes (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_content_length: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("tcpproto server starting");

    let mut config = Configuration::new(args.secret_key);
    config.use_crypto = !args.no_crypto;
    config.max_header_size = args.max_header_size;
    config.max_content_length = args.max_content_length;

    let private_key = match args.privkey {
        Some(path) => Some(client_vault::load_private_key(std::path::Path::new(&path))?),
        None => None,
    };

    let mut registry = Registry::new();
    registry.on(
        "PING",
        Arc::new(|_request, response| {
            response.body = b"PONG".to_vec();
        }),
    );

    let server = Server::bind(&args.bind, config, registry, private_key).await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server.run().await?;
    Ok(())
}
