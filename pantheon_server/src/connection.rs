//! TCP plumbing: one JSON message per line in both directions. Reads and
//! writes on the socket are the only suspension points; rule evaluation is
//! synchronous.

use std::sync::Arc;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use pantheon_core::messages::{ClientMessage, ServerMessage};

use crate::server::GameServer;

/// Drives one client for the lifetime of its connection. Returning from this
/// function is what triggers the disconnect path.
pub async fn handle_client(server: Arc<GameServer>, stream: TcpStream) {
    let (read_half, mut write_half) = stream.into_split();
    let (outbox, mut pending) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(msg) = pending.recv().await {
            let mut line = match serde_json::to_string(&msg) {
                Ok(line) => line,
                Err(err) => {
                    warn!("failed to encode message: {}", err);
                    continue;
                }
            };
            line.push('\n');
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let client = server.register(outbox).await;
    debug!("{} connected", client.id);

    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientMessage>(line) {
                    Ok(msg) => server.handle_message(&client, msg).await,
                    Err(err) => client.send(ServerMessage::Error {
                        message: format!("malformed message: {}", err),
                    }),
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!("read error for {}: {}", client.id, err);
                break;
            }
        }
    }

    server.disconnect(&client).await;
    writer.abort();
}

/// Read-only operational counters on a separate listener: one JSON object
/// per connection, then the connection is closed.
pub async fn serve_status(server: Arc<GameServer>, listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let report = server.status().await;
                match serde_json::to_string(&report) {
                    Ok(mut line) => {
                        line.push('\n');
                        let _ = stream.write_all(line.as_bytes()).await;
                    }
                    Err(err) => warn!("failed to encode status report: {}", err),
                }
            }
            Err(err) => warn!("status accept error: {}", err),
        }
    }
}
