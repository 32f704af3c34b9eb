//! UDP control channel: inbound listener and outbound result sender
//!
//! The transport is deliberately dumb. The listener task turns datagrams
//! into typed events and pushes them onto the single-consumer loop; the
//! sender task drains the outbound channel. Both run until aborted or
//! their channel closes.

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shortcutd_core::prelude::*;
use shortcutd_core::ServiceEvent;

use crate::protocol;

const MAX_DATAGRAM: usize = 64 * 1024;

/// The bound inbound side of the control channel.
pub struct ControlBus {
    socket: UdpSocket,
}

impl ControlBus {
    /// Bind the control socket on localhost. Port 0 picks an ephemeral
    /// port (used by tests).
    pub async fn bind(port: u16) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| Error::bind(port, e.to_string()))?;
        Ok(Self { socket })
    }

    /// The actual bound port (differs from the requested one for port 0).
    pub fn local_port(&self) -> Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }

    /// Spawn the listener task feeding parsed events into `events`.
    ///
    /// The task ends when the event channel closes or it is aborted.
    pub fn spawn_listener(self, events: mpsc::UnboundedSender<ServiceEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                let (len, peer) = match self.socket.recv_from(&mut buf).await {
                    Ok(received) => received,
                    Err(err) => {
                        error!(%err, "control socket receive failed");
                        continue;
                    }
                };
                let line = String::from_utf8_lossy(&buf[..len]);
                trace!(%peer, "datagram: {}", line.trim());
                if let Some(event) = protocol::parse_datagram(&line) {
                    if events.send(event).is_err() {
                        debug!("event channel closed, listener exiting");
                        break;
                    }
                }
            }
        })
    }
}

/// Spawn the task that sends queued result lines to the reply port.
pub fn spawn_result_sender(
    reply_port: u16,
    mut outbound: mpsc::UnboundedReceiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let socket = match UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await {
            Ok(socket) => socket,
            Err(err) => {
                error!(%err, "failed to bind result socket, results will be dropped");
                // Drain so reporters never block on a dead sink
                while outbound.recv().await.is_some() {}
                return;
            }
        };
        let target = SocketAddr::from((Ipv4Addr::LOCALHOST, reply_port));
        while let Some(line) = outbound.recv().await {
            if let Err(err) = socket.send_to(line.as_bytes(), target).await {
                warn!(%err, "result send failed");
            }
        }
    })
}
