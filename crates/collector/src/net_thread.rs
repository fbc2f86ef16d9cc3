//! Thread de rede que escuta UDP e envia datagramas para o laço do coletor
//! via channel.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Datagrama recebido, ainda não decodificado.
#[derive(Debug, Clone)]
pub struct NetMessage {
    pub data: Vec<u8>,
    pub source: SocketAddr,
}

/// Inicia a thread de rede sobre um clone do socket do coletor. Retorna o
/// receiver do channel.
pub fn spawn_receiver_thread(sock: UdpSocket) -> io::Result<Receiver<NetMessage>> {
    let (tx, rx) = bounded::<NetMessage>(64); // Buffer de 64 mensagens
    sock.set_read_timeout(Some(Duration::from_secs(1)))?;

    std::thread::Builder::new()
        .name("udp-receiver".into())
        .spawn(move || receiver_loop(&sock, &tx))?;

    Ok(rx)
}

fn receiver_loop(sock: &UdpSocket, tx: &Sender<NetMessage>) {
    if let Ok(addr) = sock.local_addr() {
        info!("Coletor escutando em {addr}");
    }

    let mut buf = [0u8; 512];
    loop {
        match sock.recv_from(&mut buf) {
            Ok((size, source)) => {
                let msg = NetMessage {
                    data: buf[..size].to_vec(),
                    source,
                };
                // Non-blocking send: se o laço está lento, descarta datagramas
                if tx.try_send(msg).is_err() {
                    debug!("Channel cheio, descartando datagrama de {source}");
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
