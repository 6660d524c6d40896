use crate::channel::{ChannelEvent, SignalingChannel, Subscribers};
use crate::config::ReconnectPolicy;
use crate::error::ChannelError;
use async_trait::async_trait;
use duet_core::SignalEvent;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, PartialEq, Eq)]
enum PumpOutcome {
    ConnectionLost,
    OwnerDropped,
}

/// WebSocket implementation of [`SignalingChannel`] with automatic reconnects.
pub struct WsChannel {
    outbound: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
    subscribers: Subscribers,
    driver: JoinHandle<()>,
}

impl WsChannel {
    pub async fn connect(url: &str, reconnect: ReconnectPolicy) -> Result<Self, ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        info!("Signaling channel connected to {}", url);

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let subscribers = Subscribers::default();

        let driver = tokio::spawn(drive(
            url.to_owned(),
            stream,
            outbound_rx,
            connected.clone(),
            subscribers.clone(),
            reconnect,
        ));

        Ok(Self {
            outbound,
            connected,
            subscribers,
            driver,
        })
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[async_trait]
impl SignalingChannel for WsChannel {
    async fn emit(&self, event: SignalEvent) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::Unavailable);
        }
        let json =
            serde_json::to_string(&event).map_err(|e| ChannelError::Encode(e.to_string()))?;
        debug!("WS OUT: {}", event.name());
        self.outbound
            .send(json)
            .map_err(|_| ChannelError::Unavailable)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        self.subscribers.add()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

async fn drive(
    url: String,
    mut stream: WsStream,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    connected: Arc<AtomicBool>,
    subscribers: Subscribers,
    policy: ReconnectPolicy,
) {
    loop {
        let outcome = pump(stream, &mut outbound_rx, &subscribers).await;
        connected.store(false, Ordering::SeqCst);

        if outcome == PumpOutcome::OwnerDropped {
            debug!("Signaling channel owner dropped, closing");
            break;
        }

        warn!("Signaling connection to {} lost", url);
        subscribers.publish(ChannelEvent::Disconnected);

        // Frames queued against the dead socket belong to the old session.
        while outbound_rx.try_recv().is_ok() {}

        let Some(next) = reconnect(&url, &policy).await else {
            error!("Giving up on signaling server {}", url);
            break;
        };
        stream = next;
        connected.store(true, Ordering::SeqCst);
        subscribers.publish(ChannelEvent::Reconnected);
    }
}

async fn pump(
    stream: WsStream,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    subscribers: &Subscribers,
) -> PumpOutcome {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            out = outbound_rx.recv() => match out {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        warn!("Failed to write signal frame: {}", e);
                        return PumpOutcome::ConnectionLost;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return PumpOutcome::OwnerDropped;
                }
            },

            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<SignalEvent>(&text) {
                    Ok(event) => {
                        debug!("WS IN: {}", event.name());
                        subscribers.publish(ChannelEvent::Signal(event));
                    }
                    Err(e) => warn!("Invalid signal frame: {}. Text: {}", e, text),
                },
                Some(Ok(Message::Close(_))) | None => return PumpOutcome::ConnectionLost,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Signaling socket error: {}", e);
                    return PumpOutcome::ConnectionLost;
                }
            },
        }
    }
}

async fn reconnect(url: &str, policy: &ReconnectPolicy) -> Option<WsStream> {
    let mut attempt: u32 = 0;
    loop {
        if policy.max_attempts != 0 && attempt >= policy.max_attempts {
            return None;
        }
        attempt += 1;
        tokio::time::sleep(policy.delay).await;

        match connect_async(url).await {
            Ok((stream, _)) => {
                info!("Reconnected to {} after {} attempt(s)", url, attempt);
                return Some(stream);
            }
            Err(e) => warn!("Reconnect attempt {} to {} failed: {}", attempt, url, e),
        }
    }
}
