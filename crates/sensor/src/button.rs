//! Botão do nó: cada linha (Enter) no stdin é um clique.

use crossbeam_channel::Sender;
use std::io::{self, BufRead};
use tracing::{debug, info};
use wsn_core::node::Event;

pub fn spawn_button_thread(tx: Sender<Event>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("button".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                if line.is_err() {
                    break;
                }
                if tx.send(Event::ButtonPressed).is_err() {
                    break;
                }
            }
            debug!("stdin fechado, botão desativado");
        })?;
    info!("Pressione Enter para alternar °C/°F");
    Ok(())
}
