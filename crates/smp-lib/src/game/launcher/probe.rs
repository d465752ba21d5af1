use std::time::Duration;
use tokio::net::TcpStream;

/// Plain TCP reachability check. No protocol handshake is attempted.
pub async fn probe_server(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => {
            log::info!("Server {}:{} is reachable", host, port);
            true
        }
        Ok(Err(e)) => {
            log::warn!("Server {}:{} unreachable: {}", host, port, e);
            false
        }
        Err(_) => {
            log::warn!("Server {}:{} did not answer within {:?}", host, port, timeout);
            false
        }
    }
}
