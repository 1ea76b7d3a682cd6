//! Connection - handles an individual WebSocket client.
//!
//! Each connection runs in its own tokio task: a unified `select!` loop
//! reads inbound frames and drains the outgoing channel registered with the
//! [`SenderTable`]. Inbound frames are decoded at the boundary and
//! dispatched to the engine; whatever role the connection takes (staff or
//! customer) is decided by the frames it sends. On any exit path the
//! connection unregisters itself and reports a disconnect to the engine.

use crate::config::LimitsConfig;
use crate::error::ConnectionResult;
use crate::network::limit::RateLimiter;
use crate::network::sender::SenderTable;
use crate::state::{ChatEngine, ConnId};
use desk_proto::ClientFrame;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, instrument, warn};

/// A client connection handler.
pub struct Connection {
    id: ConnId,
    addr: SocketAddr,
    engine: Arc<ChatEngine>,
    senders: Arc<SenderTable>,
    limits: LimitsConfig,
}

impl Connection {
    pub fn new(
        id: ConnId,
        addr: SocketAddr,
        engine: Arc<ChatEngine>,
        senders: Arc<SenderTable>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            id,
            addr,
            engine,
            senders,
            limits,
        }
    }

    /// Run the connection loop until the peer goes away.
    #[instrument(skip(self, ws_stream), fields(conn_id = %self.id, addr = %self.addr), name = "connection")]
    pub async fn run(self, ws_stream: WebSocketStream<TcpStream>) -> ConnectionResult {
        info!("client connected");

        let (mut ws_writer, mut ws_reader) = ws_stream.split();

        // Outgoing frames: queued by the engine through the SenderTable,
        // written by this task.
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel();
        self.senders.register(self.id, outgoing_tx);

        let mut limiter = RateLimiter::new(
            self.limits.message_rate_per_second,
            self.limits.message_burst,
        );

        let result = loop {
            tokio::select! {
                inbound = ws_reader.next() => {
                    match inbound {
                        Some(Ok(WsMessage::Text(raw))) => {
                            if !limiter.check() {
                                warn!("rate limit exceeded, frame dropped");
                                continue;
                            }
                            match ClientFrame::decode(&raw) {
                                Ok(frame) => self.dispatch(frame),
                                Err(e) => debug!(error = %e, "ignoring malformed frame"),
                            }
                        }
                        Some(Ok(WsMessage::Ping(payload))) => {
                            if let Err(e) = ws_writer.send(WsMessage::Pong(payload)).await {
                                warn!(error = %e, "write error");
                                break Err(e.into());
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            info!("client disconnected");
                            break Ok(());
                        }
                        // Binary and stray pongs carry nothing for us.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(error = %e, "read error");
                            break Err(e.into());
                        }
                    }
                }

                Some(frame) = outgoing_rx.recv() => {
                    let encoded = match frame.encode() {
                        Ok(encoded) => encoded,
                        Err(e) => break Err(e.into()),
                    };
                    if let Err(e) = ws_writer.send(WsMessage::Text(encoded)).await {
                        warn!(error = %e, "write error");
                        break Err(e.into());
                    }
                }
            }
        };

        self.senders.unregister(self.id);
        self.engine.disconnect(self.id);
        result
    }

    fn dispatch(&self, frame: ClientFrame) {
        match frame {
            ClientFrame::StaffOnline { name } => self.engine.staff_online(self.id, name),
            ClientFrame::CustomerConnect => self.engine.customer_connect(self.id),
            ClientFrame::Message { message } => self.engine.inbound_message(self.id, message),
        }
    }
}
