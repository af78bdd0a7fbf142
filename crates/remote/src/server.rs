// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Each connection is served by its own task. Requests on one connection
//! are answered in arrival order, each reply echoing its `request_id`.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use reel_core::protocol::{ClientMessage, ErrorCode, Response, ServerMessage};

use crate::state::ServerState;

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    accept_loop(listener, state).await?;
    Ok(())
}

/// Accept connections until the listener fails.
pub(crate) async fn accept_loop(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let reply = handle_text(text.as_str(), &state).await;
                ws_sink.send(Message::Text(reply.to_json()?.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(_) => {
                // Binary, Pong and raw frames carry nothing for us
            }
            Err(e) => {
                warn!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Decode one text frame and answer it.
///
/// Frames that do not parse get an `invalid_argument` reply with request id 0,
/// which no client ever issues.
pub(crate) async fn handle_text(text: &str, state: &ServerState) -> ServerMessage {
    match ClientMessage::from_json(text) {
        Ok(msg) => {
            debug!(request_id = msg.request_id, request = ?msg.request, "received request");
            let response = state.handle(msg.request).await;
            ServerMessage::new(msg.request_id, response)
        }
        Err(e) => {
            warn!(error = %e, "malformed client frame");
            ServerMessage::new(
                0,
                Response::error(ErrorCode::InvalidArgument, format!("malformed request: {e}")),
            )
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
