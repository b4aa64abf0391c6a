//! UDP link to the peer
//!
//! A background thread polls the socket and posts decoded updates on a channel. It
//! never touches the world; the simulation drains the channel at the top of a tick.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use super::NetworkUpdate;
use crate::consts::{NET_BACKOFF_MS, NET_MAX_DATAGRAM, NET_RECV_RETRIES};
use crate::error::{Error, Result};
use crate::settings::{NetMode, NetworkSettings};

pub struct NetLink {
    socket: UdpSocket,
    /// Set once: up front for a client, on first datagram for a server
    peer: Arc<OnceLock<SocketAddr>>,
    shutdown: Arc<AtomicBool>,
    inbox: Option<Receiver<NetworkUpdate>>,
    receiver: Option<JoinHandle<()>>,
}

impl NetLink {
    /// Open the link described by `settings.mode`
    pub fn open(settings: &NetworkSettings) -> Result<Self> {
        match settings.mode {
            NetMode::Alone => Err(Error::InvalidSettings(
                "networking is disabled in alone mode".into(),
            )),
            NetMode::Server => {
                let local = SocketAddr::from(([0, 0, 0, 0], settings.port));
                log::info!("Listening for a peer on {}", local);
                Self::bind(local, None)
            }
            NetMode::Client => {
                let peer = (settings.host.as_str(), settings.port)
                    .to_socket_addrs()?
                    .next()
                    .ok_or_else(|| {
                        Error::InvalidSettings(format!("cannot resolve host {}", settings.host))
                    })?;
                log::info!("Connecting to server {}", peer);
                Self::bind(SocketAddr::from(([0, 0, 0, 0], 0)), Some(peer))
            }
        }
    }

    /// Bind `local` and start the receive thread
    pub fn bind(local: SocketAddr, peer: Option<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;

        let peer_slot = Arc::new(OnceLock::new());
        if let Some(addr) = peer {
            let _ = peer_slot.set(addr);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let (tx, rx) = unbounded();

        let receiver = {
            let socket = socket.try_clone()?;
            let peer = Arc::clone(&peer_slot);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("net-recv".into())
                .spawn(move || receive_loop(socket, tx, peer, shutdown))?
        };

        Ok(Self {
            socket,
            peer: peer_slot,
            shutdown,
            inbox: Some(rx),
            receiver: Some(receiver),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer.get().copied()
    }

    /// Hand the inbound channel to the world; only the first call gets it
    pub fn take_inbox(&mut self) -> Option<Receiver<NetworkUpdate>> {
        self.inbox.take()
    }

    /// Send one update. Returns false when no peer is known yet.
    pub fn send(&self, update: &NetworkUpdate) -> Result<bool> {
        let Some(peer) = self.peer() else {
            return Ok(false);
        };

        let bytes = update.encode()?;
        match self.socket.send_to(&bytes, peer) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                log::debug!("Send to {} would block, dropping update", peer);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for NetLink {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.receiver.take() {
            if handle.join().is_err() {
                log::warn!("Network receive thread panicked");
            }
        }
    }
}

/// Poll until shut down or the simulation drops its inbox.
///
/// A burst of non-blocking reads runs back to back; when the whole burst comes up
/// empty the thread sleeps before polling again.
fn receive_loop(
    socket: UdpSocket,
    tx: Sender<NetworkUpdate>,
    peer: Arc<OnceLock<SocketAddr>>,
    shutdown: Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; NET_MAX_DATAGRAM];
    let backoff = Duration::from_millis(NET_BACKOFF_MS);

    while !shutdown.load(Ordering::Relaxed) {
        let mut received = None;
        for _ in 0..NET_RECV_RETRIES {
            match socket.recv_from(&mut buf) {
                Ok(datagram) => {
                    received = Some(datagram);
                    break;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => log::warn!("Receive failed: {}", e),
            }
        }

        let Some((len, from)) = received else {
            thread::sleep(backoff);
            continue;
        };

        if peer.set(from).is_ok() {
            log::info!("Peer {} connected", from);
        }

        match NetworkUpdate::decode(&buf[..len]) {
            Ok(update) => {
                if tx.send(update).is_err() {
                    break;
                }
            }
            Err(e) => log::warn!("Dropping datagram from {}: {}", from, e),
        }
    }

    log::debug!("Network receive thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{BulletState, PlayerPose};
    use glam::Vec2;

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    fn sample() -> NetworkUpdate {
        NetworkUpdate {
            player: PlayerPose {
                position: Vec2::new(100.0, 200.0),
                velocity: Vec2::new(1.0, 1.0),
                angle: 1.0,
            },
            bullets: vec![BulletState {
                position: Vec2::new(101.0, 190.0),
                velocity: Vec2::new(0.0, -150.0),
            }],
        }
    }

    #[test]
    fn test_server_learns_peer_and_receives() {
        let mut server = NetLink::bind(loopback(), None).unwrap();
        let inbox = server.take_inbox().unwrap();
        assert!(server.take_inbox().is_none());
        assert_eq!(server.peer(), None);
        assert!(!server.send(&sample()).unwrap());

        let server_addr = server.local_addr().unwrap();
        let client = NetLink::bind(loopback(), Some(server_addr)).unwrap();
        assert!(client.send(&sample()).unwrap());

        let got = inbox.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got, sample());
        assert_eq!(server.peer(), Some(client.local_addr().unwrap()));
    }

    #[test]
    fn test_malformed_datagram_is_skipped() {
        let mut server = NetLink::bind(loopback(), None).unwrap();
        let inbox = server.take_inbox().unwrap();
        let server_addr = server.local_addr().unwrap();

        let raw = UdpSocket::bind(loopback()).unwrap();
        raw.send_to(b"garbage", server_addr).unwrap();
        raw.send_to(&sample().encode().unwrap(), server_addr).unwrap();

        let got = inbox.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got, sample());
    }

    #[test]
    fn test_alone_mode_refuses_to_open() {
        let settings = NetworkSettings::default();
        assert!(matches!(
            NetLink::open(&settings),
            Err(Error::InvalidSettings(_))
        ));
    }
}
