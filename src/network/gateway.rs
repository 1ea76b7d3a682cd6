//! Gateway - WebSocket listener that accepts incoming connections.
//!
//! Binds the configured address, validates the Origin header during the
//! WebSocket handshake, assigns each accepted socket a connection id, and
//! spawns a [`Connection`] task for it.

use crate::config::{Config, LimitsConfig};
use crate::network::{Connection, SenderTable};
use crate::state::{ChatEngine, ConnIdGenerator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;
use tracing::{error, info, instrument, warn};

/// The Gateway accepts incoming WebSocket connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    allow_origins: Vec<String>,
    limits: LimitsConfig,
    engine: Arc<ChatEngine>,
    senders: Arc<SenderTable>,
    conn_ids: ConnIdGenerator,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(
        config: &Config,
        engine: Arc<ChatEngine>,
        senders: Arc<SenderTable>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.listen.address).await?;
        info!(address = %config.listen.address, "WebSocket listener bound");

        Ok(Self {
            listener,
            allow_origins: config.listen.allow_origins.clone(),
            limits: config.limits,
            engine,
            senders,
            conn_ids: ConnIdGenerator::new(),
        })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(%addr, "connection attempt");

                    let id = self.conn_ids.next();
                    let engine = Arc::clone(&self.engine);
                    let senders = Arc::clone(&self.senders);
                    let limits = self.limits;
                    let allowed = self.allow_origins.clone();

                    tokio::spawn(async move {
                        // Origin validation callback for the handshake.
                        let origin_callback =
                            |req: &http::Request<()>, response: http::Response<()>| {
                                // An empty allow list allows all origins.
                                if allowed.is_empty() {
                                    return Ok(response);
                                }

                                if let Some(origin) =
                                    req.headers().get("Origin").and_then(|o| o.to_str().ok())
                                {
                                    if allowed.iter().any(|a| a == origin || a == "*") {
                                        return Ok(response);
                                    }
                                    warn!(%addr, origin = %origin, "origin rejected");
                                }

                                Err(http::Response::builder()
                                    .status(http::StatusCode::FORBIDDEN)
                                    .body(Some("Origin not allowed".to_string()))
                                    .unwrap())
                            };

                        match accept_hdr_async(stream, origin_callback).await {
                            Ok(ws_stream) => {
                                let connection =
                                    Connection::new(id, addr, engine, senders, limits);
                                if let Err(e) = connection.run(ws_stream).await {
                                    error!(
                                        conn_id = id,
                                        %addr,
                                        error = %e,
                                        code = e.error_code(),
                                        "connection error"
                                    );
                                }
                                info!(conn_id = id, %addr, "connection closed");
                            }
                            Err(e) => {
                                warn!(%addr, error = %e, "WebSocket handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}
