//! Rota estática até o coletor.
//!
//! Sem stack mesh no host: o root é alcançável quando o endereço do coletor
//! foi configurado corretamente.

use std::net::SocketAddr;
use wsn_core::traits::Routing;

#[derive(Debug, Clone)]
pub struct StaticRoute {
    root: Option<SocketAddr>,
}

impl StaticRoute {
    pub fn new(root: Option<SocketAddr>) -> Self {
        Self { root }
    }
}

impl Routing for StaticRoute {
    fn is_root_reachable(&self) -> bool {
        self.root.is_some()
    }

    fn root_address(&self) -> Option<SocketAddr> {
        self.root
    }
}
