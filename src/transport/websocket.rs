//! WebSocket transport
//!
//! Accepts TCP connections, performs the WebSocket upgrade on the configured
//! path and runs one session per connection:
//! - register the connection with the `Hub`
//! - a writer task drains the connection's bounded outbound queue into the
//!   socket, giving each write `write_timeout_ms` to complete
//! - the session loop decodes inbound events and publishes their content to
//!   the broker channel
//!
//! Any origin is accepted. A frame that does not decode is logged and
//! skipped. The session ends when the socket fails or closes, or when the
//! writer gives up on a peer that stopped reading; either way the connection
//! is deregistered on the way out and the socket is dropped.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, error, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;

use crate::config::{ServerSettings, Settings};
use crate::hub::intake::{Backoff, run_intake};
use crate::hub::{Event, Hub};
use crate::utils::Result;

/// Pause after a failed `accept` so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Why a session loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer sent a close frame.
    Closed,
    /// The stream ended without a close frame.
    Disconnected,
    /// Reading from the socket failed.
    ReadError(String),
    /// The writer stopped: a write failed or timed out.
    WriterStopped,
}

/// Start the hub: subscribe to the broker channel, start the intake loop,
/// then bind and serve until the listener fails.
///
/// A failed subscription is returned before anything is bound or spawned;
/// without the broker the hub has nothing to deliver.
pub async fn run(settings: &Settings, hub: Arc<Hub>) -> Result<()> {
    let subscription = hub.subscribe().await?;
    tokio::spawn(run_intake(
        hub.clone(),
        subscription,
        Backoff::from_settings(&settings.broker),
    ));

    start_websocket_server(&settings.listen_address(), &settings.server, hub).await
}

/// Bind `addr` and serve upgrade requests until the listener fails.
pub async fn start_websocket_server(
    addr: &str,
    server: &ServerSettings,
    hub: Arc<Hub>,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("server started at ws://{}{}", listener.local_addr()?, server.path);
    serve(listener, server, hub).await
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, server: &ServerSettings, hub: Arc<Hub>) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        let hub = hub.clone();
        let server = server.clone();
        tokio::spawn(async move {
            handle_connection(stream, peer, &server, hub).await;
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    server: &ServerSettings,
    hub: Arc<Hub>,
) {
    let ws_stream = match accept_hdr_async(stream, |req: &Request, resp: Response| {
        check_path(req, resp, &server.path)
    })
    .await
    {
        Ok(ws) => ws,
        Err(e) => {
            error!(%peer, error = %e, "upgrader error");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<WsMessage>(server.queue_capacity.max(1));
    let (client, registration) = hub.register(tx);
    let client_id = client.id.clone();
    // the registry holds the only long-lived sender from here on
    drop(client);
    info!(client_id = %client_id, %peer, "client has joined");

    let write_timeout = Duration::from_millis(server.write_timeout_ms);
    let mut writer = {
        let client_id = client_id.clone();
        spawn(async move {
            while let Some(msg) = rx.recv().await {
                match timeout(write_timeout, ws_sender.send(msg)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(client_id = %client_id, error = %e, "failed to write to client");
                        break;
                    }
                    Err(_) => {
                        warn!(client_id = %client_id, ?write_timeout, "write to client timed out");
                        break;
                    }
                }
            }
            let _ = timeout(write_timeout, ws_sender.close()).await;
            debug!(client_id = %client_id, "send loop closed");
        })
    };

    let end = tokio::select! {
        end = run_session(&hub, &client_id, &mut ws_receiver) => end,
        _ = &mut writer => SessionEnd::WriterStopped,
    };
    info!(client_id = %client_id, reason = ?end, "client disconnected");

    registration.release();
    if end != SessionEnd::WriterStopped {
        // queued frames are flushed once the last sender is dropped
        let _ = writer.await;
    }
}

/// Read events from `inbound` and publish their content until the channel
/// itself fails or closes.
///
/// Publish failures and undecodable frames only cost that one message.
pub async fn run_session<S>(hub: &Hub, client_id: &str, inbound: &mut S) -> SessionEnd
where
    S: Stream<Item = std::result::Result<WsMessage, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = inbound.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                warn!(client_id, error = %e, "error on ws, closing session");
                return SessionEnd::ReadError(e.to_string());
            }
        };

        match msg {
            WsMessage::Text(_) | WsMessage::Binary(_) => {
                let event = match Event::from_ws_message(&msg) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(client_id, error = %e, "skipping malformed message");
                        continue;
                    }
                };

                debug!(client_id, content = %event.content, "going to publish message");
                if let Err(e) = hub.publish(&event.content).await {
                    warn!(client_id, error = %e, "error on broker publish");
                }
            }
            WsMessage::Close(_) => return SessionEnd::Closed,
            // ping/pong is answered by tungstenite
            _ => {}
        }
    }

    SessionEnd::Disconnected
}

fn check_path(
    req: &Request,
    resp: Response,
    path: &str,
) -> std::result::Result<Response, ErrorResponse> {
    if req.uri().path() == path {
        return Ok(resp);
    }

    let mut rejection = ErrorResponse::new(Some(format!(
        "no websocket endpoint at {}",
        req.uri().path()
    )));
    *rejection.status_mut() = StatusCode::NOT_FOUND;
    Err(rejection)
}
