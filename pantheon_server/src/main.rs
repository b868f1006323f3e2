mod connection;
mod matchmaking;
mod server;

use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

use crate::server::GameServer;

const DEFAULT_PORT: u16 = 7878;

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("Usage: [SERVER_PORT]");
    let args: Vec<String> = std::env::args().collect();
    let port: u16 = args
        .get(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind game port");
    // status queries stay off the game port
    let status_listener = TcpListener::bind(("0.0.0.0", port + 1))
        .await
        .expect("failed to bind status port");
    info!("listening on port {} (status on {})", port, port + 1);

    let server = Arc::new(GameServer::new());
    tokio::spawn(server.clone().run_matchmaking());
    tokio::spawn(connection::serve_status(server.clone(), status_listener));

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("connection from {}", addr);
                tokio::spawn(connection::handle_client(server.clone(), stream));
            }
            Err(err) => warn!("accept error: {}", err),
        }
    }
}
