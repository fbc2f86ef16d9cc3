//! Socket UDP do nó: envio de frames e thread que encaminha datagramas
//! recebidos para o laço de eventos via channel.

use crossbeam_channel::Sender;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, warn};
use wsn_core::node::Event;
use wsn_core::protocol::MAX_FRAME_LEN;
use wsn_core::traits::Transport;

/// Lado de envio do socket. Só o nó transmite.
pub struct UdpTransport {
    sock: UdpSocket,
}

impl UdpTransport {
    pub fn new(sock: UdpSocket) -> Self {
        Self { sock }
    }
}

impl Transport for UdpTransport {
    fn send_to(&mut self, dst: SocketAddr, frame: &[u8]) -> io::Result<usize> {
        self.sock.send_to(frame, dst)
    }
}

/// Inicia a thread de recepção sobre um clone do socket do nó.
pub fn spawn_receiver_thread(sock: UdpSocket, tx: Sender<Event>) -> io::Result<()> {
    sock.set_read_timeout(Some(Duration::from_secs(1)))?;

    std::thread::Builder::new()
        .name("udp-receiver".into())
        .spawn(move || receiver_loop(&sock, &tx))?;

    Ok(())
}

fn receiver_loop(sock: &UdpSocket, tx: &Sender<Event>) {
    // Folga acima do maior frame para detectar lixo sem truncar
    let mut buf = [0u8; MAX_FRAME_LEN * 8];
    loop {
        match sock.recv_from(&mut buf) {
            Ok((size, addr)) => {
                debug!("← {size} bytes de {addr}");
                let event = Event::Datagram(buf[..size].to_vec());
                // Non-blocking send: se o laço está ocupado, descarta o datagrama
                if tx.try_send(event).is_err() {
                    debug!("Channel cheio, descartando datagrama");
                }
            }
            Err(ref e)
                if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock =>
            {
                // Timeout normal, continua
            }
            Err(e) => {
                warn!("Erro ao receber UDP: {e}");
            }
        }
    }
}
