use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use backscroll_sync::transport::{ChannelClosedSnafu, DisconnectedSnafu};
use backscroll_sync::{Transport, TransportEvent, TransportResult};
use futures::{SinkExt, StreamExt};
use snafu::{OptionExt, ResultExt, ensure};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::{ClientResult, ConnectSnafu};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Outbound {
    Frame(String),
    Close,
}

/// Sending half of a WebSocket chat connection.
pub struct WebSocketTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    connected: Arc<AtomicBool>,
}

/// A live connection: the transport, its event feed and the socket pump task.
pub struct WebSocketConnection {
    pub transport: WebSocketTransport,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub pump: JoinHandle<()>,
}

/// Opens the socket and starts pumping frames.
///
/// The event feed starts with [`TransportEvent::Opened`] and ends with
/// [`TransportEvent::Closed`] once the socket goes away for any reason.
pub async fn connect(url: &str) -> ClientResult<WebSocketConnection> {
    let (socket, _response) = connect_async(url).await.context(ConnectSnafu {
        stage: "websocket-connect",
        url: url.to_string(),
    })?;
    tracing::info!("connected to {}", url);

    let connected = Arc::new(AtomicBool::new(true));
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _ = event_tx.send(TransportEvent::Opened);

    let pump = tokio::spawn(pump(socket, outbound_rx, event_tx, connected.clone()));

    Ok(WebSocketConnection {
        transport: WebSocketTransport {
            outbound: outbound_tx,
            connected,
        },
        events: event_rx,
        pump,
    })
}

async fn pump(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
    connected: Arc<AtomicBool>,
) {
    let (mut writer, mut reader) = socket.split();

    loop {
        tokio::select! {
            next = outbound.recv() => match next {
                Some(Outbound::Frame(frame)) => {
                    if let Err(error) = writer.send(Message::Text(frame.into())).await {
                        tracing::warn!("failed to write websocket frame: {}", error);
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = writer.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = reader.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Frame(text.as_str().to_owned())).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // tungstenite answers pings itself; binary frames are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    tracing::warn!("websocket read failed: {}", error);
                    break;
                }
            },
        }
    }

    connected.store(false, Ordering::SeqCst);
    let _ = events.send(TransportEvent::Closed);
}

impl Transport for WebSocketTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send(&mut self, frame: String) -> TransportResult<()> {
        ensure!(
            self.is_connected(),
            DisconnectedSnafu {
                stage: "websocket-send",
            }
        );

        self.outbound
            .send(Outbound::Frame(frame))
            .ok()
            .context(ChannelClosedSnafu {
                stage: "websocket-send",
            })
    }

    fn close(&mut self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.outbound.send(Outbound::Close);
        }
    }
}
