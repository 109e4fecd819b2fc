//! CLI for fanhub
//!
//! Subcommands:
//! - `server`: run the hub
//! - `client`: connect, publish one event and print what comes back (smoke test)

use std::sync::Arc;

use clap::Parser;
use fanhub::broker::{Broker, MemoryBroker, RedisBroker};
use fanhub::config::{DEFAULT_CONFIG_PATH, Settings, load_config_from};
use fanhub::hub::Hub;
use fanhub::transport;
use fanhub::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fanhub")]
enum Command {
    /// Start the hub
    Server {
        /// Settings file, extension optional
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
        /// Relay through an in-process broker instead of Redis
        #[arg(long)]
        memory_broker: bool,
    },
    /// Publish one event and print the first event received
    Client {
        /// WebSocket URL of the hub
        #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
        url: String,
        /// Content to publish
        #[arg(long, default_value = "hello")]
        message: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    match Command::parse() {
        Command::Server {
            config,
            memory_broker,
        } => {
            let settings = match load_config_from(&config) {
                Ok(settings) => settings,
                Err(e) => {
                    logging::init("info");
                    error!("Failed to load configuration: {}", e);
                    std::process::exit(1);
                }
            };
            logging::init(&settings.log.level);

            if let Err(e) = run_server(settings, memory_broker).await {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Client { url, message } => {
            logging::init("info");
            if let Err(e) = run_client(&url, &message).await {
                error!("Client failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run_server(settings: Settings, memory_broker: bool) -> fanhub::utils::Result<()> {
    let broker: Arc<dyn Broker> = if memory_broker {
        Arc::new(MemoryBroker::new())
    } else {
        Arc::new(RedisBroker::open(&settings.broker.url)?)
    };
    let hub = Arc::new(Hub::new(broker, settings.broker.channel.clone()));

    tokio::select! {
        res = transport::run(&settings, hub) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_client(url: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    use fanhub::hub::Event;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;

    let event = serde_json::to_string(&Event::new(message))?;
    ws_stream.send(WsMessage::Text(event.into())).await?;

    while let Some(frame) = ws_stream.next().await {
        if let WsMessage::Text(incoming) = frame? {
            println!("Incoming: {incoming}");
            break;
        }
    }

    ws_stream.close(None).await?;
    Ok(())
}
