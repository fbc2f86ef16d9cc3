//! Laço de eventos cooperativo do nó.
//!
//! Espera o próximo deadline dos timers ou um evento externo (botão,
//! datagrama) e despacha tudo na mesma thread.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::error;
use wsn_core::node::{Event, SensorNode};
use wsn_core::timer::Scheduler;
use wsn_core::traits::{Indicator, Routing, TemperatureSensor, Transport};

/// Espera máxima quando não há timers armados.
const IDLE_WAIT: Duration = Duration::from_secs(1);

pub fn run<R, S, I, T>(
    node: &mut SensorNode<R, S, I, T>,
    scheduler: &mut Scheduler,
    rx: &Receiver<Event>,
) where
    R: Routing,
    S: TemperatureSensor,
    I: Indicator,
    T: Transport,
{
    loop {
        if !step(node, scheduler, rx) {
            error!("Fontes de eventos encerradas, parando o nó");
            return;
        }
    }
}

/// Uma passada do escalonador. Retorna `false` quando o channel fechou.
fn step<R, S, I, T>(
    node: &mut SensorNode<R, S, I, T>,
    scheduler: &mut Scheduler,
    rx: &Receiver<Event>,
) -> bool
where
    R: Routing,
    S: TemperatureSensor,
    I: Indicator,
    T: Transport,
{
    for tick in scheduler.poll(Instant::now()) {
        node.dispatch(Event::Tick(tick));
    }

    let wait = scheduler
        .next_deadline()
        .map(|d| d.saturating_duration_since(Instant::now()))
        .unwrap_or(IDLE_WAIT);

    match rx.recv_timeout(wait) {
        Ok(event) => {
            node.dispatch(event);
            true
        }
        Err(RecvTimeoutError::Timeout) => true,
        Err(RecvTimeoutError::Disconnected) => false,
    }
}
