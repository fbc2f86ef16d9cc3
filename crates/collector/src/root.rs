//! Papel de root da rede no host.

use std::net::{SocketAddr, UdpSocket};
use tracing::{info, warn};
use wsn_core::traits::RootRouting;

/// Root "virtual": o endereço do root é o endereço local do socket.
pub struct HostRoot {
    address: Option<SocketAddr>,
}

impl HostRoot {
    pub fn new(sock: &UdpSocket) -> Self {
        Self {
            address: sock.local_addr().ok(),
        }
    }
}

impl RootRouting for HostRoot {
    fn become_root(&mut self) {
        match self.address {
            Some(addr) => info!("Coletor assumiu o papel de root em {addr}"),
            None => warn!("Coletor sem endereço local, root sem endereço anunciado"),
        }
    }

    fn root_address(&self) -> Option<SocketAddr> {
        self.address
    }
}
