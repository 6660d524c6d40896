use anyhow::Result;
use duet_core::ConnectionId;
use std::time::Duration;
use tokio::sync::mpsc;

use super::mock_signaling::Delivered;

/// Timeout for signal delivery (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// Quiet period after which no further signals are expected (ms).
pub const QUIET_MS: u64 = 100;

/// Wait for the next event named `name` delivered to `conn_id`.
pub async fn wait_for_event(
    signal_rx: &mut mpsc::UnboundedReceiver<Delivered>,
    conn_id: ConnectionId,
    name: &str,
) -> Result<Delivered> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SIGNAL_TIMEOUT_MS);

    loop {
        match tokio::time::timeout_at(deadline, signal_rx.recv()).await {
            Ok(Some(d)) if d.conn_id == conn_id && d.event.name() == name => return Ok(d),
            Ok(Some(_)) => continue,
            Ok(None) => anyhow::bail!("Signal channel closed"),
            Err(_) => anyhow::bail!("Timeout waiting for {} to {}", name, conn_id),
        }
    }
}

/// Drain everything delivered until the room goes quiet.
pub async fn drain(signal_rx: &mut mpsc::UnboundedReceiver<Delivered>) -> Vec<Delivered> {
    let mut seen = Vec::new();
    while let Ok(Some(d)) =
        tokio::time::timeout(Duration::from_millis(QUIET_MS), signal_rx.recv()).await
    {
        seen.push(d);
    }
    seen
}
