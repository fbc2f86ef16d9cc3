//! Colaboradores externos consumidos pelo núcleo.
//!
//! Roteamento mesh, sensor físico, LED e socket ficam fora do protocolo; o
//! núcleo só conhece estas interfaces.

use crate::types::RawTemperature;
use std::io;
use std::net::SocketAddr;

/// Visão do nó sobre o roteamento até o root.
pub trait Routing {
    /// Existe caminho até o root de coleta?
    fn is_root_reachable(&self) -> bool;

    /// Endereço do root, se conhecido.
    fn root_address(&self) -> Option<SocketAddr>;
}

/// Roteamento do lado do coletor, que é o próprio root.
pub trait RootRouting {
    /// Assume o papel de root da rede.
    fn become_root(&mut self);

    fn root_address(&self) -> Option<SocketAddr>;
}

/// Sensor de temperatura em quartos de grau Celsius.
pub trait TemperatureSensor {
    fn read_raw_temperature(&mut self) -> RawTemperature;
}

/// LED de feedback visual.
pub trait Indicator {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);
}

/// Envio de datagramas.
pub trait Transport {
    fn send_to(&mut self, dst: SocketAddr, frame: &[u8]) -> io::Result<usize>;
}
