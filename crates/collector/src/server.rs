//! Laço do coletor: decodifica datagramas, responde registros e escreve as
//! linhas de telemetria.

use crate::net_thread::NetMessage;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::Write;
use std::net::UdpSocket;
use std::time::Instant;
use tracing::{debug, error, info};
use wsn_core::collector::{CollectorAction, handle_datagram};
use wsn_core::stats::TelemetryStats;
use wsn_core::timer::PeriodicTimer;
use wsn_core::traits::RootRouting;

/// Estado do coletor entre datagramas.
pub struct Collector {
    stats: Option<TelemetryStats>,
}

impl Collector {
    pub fn new(stats_enabled: bool) -> Self {
        Self {
            stats: stats_enabled.then(TelemetryStats::new),
        }
    }

    /// Trata um datagrama. Retorna os bytes de resposta, se houver.
    ///
    /// Linhas de telemetria vão para `out`; datagramas inválidos são
    /// descartados sem resposta.
    pub fn handle(&mut self, msg: &NetMessage, out: &mut impl Write) -> Option<Vec<u8>> {
        match handle_datagram(&msg.data) {
            Ok(CollectorAction::Reply(bytes)) => Some(bytes),
            Ok(CollectorAction::Report(report)) => {
                if let Err(e) = writeln!(out, "{report}") {
                    error!("Erro ao escrever report: {e}");
                }
                if let Some(stats) = self.stats.as_mut() {
                    let node = stats.record(&report);
                    info!(
                        "Nó {}: {:.2}°C / {:.2}°F | média {:.2}°C / {:.2}°F ({} amostras) | alarme {}",
                        report.node_id,
                        node.last_celsius,
                        node.last_fahrenheit,
                        node.avg_celsius(),
                        node.avg_fahrenheit(),
                        node.samples,
                        if node.last_alarm { "ON" } else { "OFF" }
                    );
                }
                None
            }
            Ok(CollectorAction::Ignore) => None,
            Err(e) => {
                debug!("Datagrama inválido de {}: {e}", msg.source);
                None
            }
        }
    }

    pub fn stats(&self) -> Option<&TelemetryStats> {
        self.stats.as_ref()
    }

    /// Uma linha de resumo por nó visto, em ordem de id.
    pub fn summary(&self) -> Vec<String> {
        let Some(stats) = self.stats() else {
            return Vec::new();
        };
        stats
            .iter()
            .map(|(id, node)| {
                format!(
                    "Nó {id}: {} amostras | média {:.2}°C / {:.2}°F | alarme {}",
                    node.samples,
                    node.avg_celsius(),
                    node.avg_fahrenheit(),
                    if node.last_alarm { "ON" } else { "OFF" }
                )
            })
            .collect()
    }
}

/// Laço principal: datagramas + anúncio periódico do root.
pub fn run(
    collector: &mut Collector,
    root: &impl RootRouting,
    sock: &UdpSocket,
    rx: &Receiver<NetMessage>,
    mut announce: PeriodicTimer,
) {
    let stdout = std::io::stdout();
    loop {
        let now = Instant::now();
        if announce.expired(now) {
            announce.reset(now);
            match root.root_address() {
                Some(addr) => info!("Endereço do root: {addr}"),
                None => info!("Root ainda sem endereço"),
            }
            for line in collector.summary() {
                info!("{line}");
            }
        }

        let wait = announce.deadline().saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(msg) => {
                if let Some(reply) = collector.handle(&msg, &mut stdout.lock()) {
                    if let Err(e) = sock.send_to(&reply, msg.source) {
                        error!("Erro ao enviar REG_ACK para {}: {e}", msg.source);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                error!("Thread de rede encerrada, parando o coletor");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsn_core::Frame;
    use wsn_core::fixed_point::celsius_to_q12_4;
    use wsn_core::protocol::{ALARM_KIND_TEMPERATURE, InfoFrame};
    use wsn_core::types::Unit;

    fn msg(data: Vec<u8>) -> NetMessage {
        NetMessage {
            data,
            source: "127.0.0.1:8765".parse().unwrap(),
        }
    }

    fn info(node_id: u8, raw: i16) -> Vec<u8> {
        Frame::Info(InfoFrame {
            node_id,
            unit: Unit::Celsius,
            temp_q12_4: celsius_to_q12_4(raw),
            alarm_kind: ALARM_KIND_TEMPERATURE,
            alarm_state: raw > 140,
        })
        .encode()
    }

    #[test]
    fn register_request_is_answered() {
        let mut collector = Collector::new(true);
        let mut out = Vec::new();
        let reply = collector.handle(&msg(vec![0x55, 0x10, 0xAA]), &mut out);
        assert_eq!(reply, Some(vec![0x55, 0x11, 0xAA, 0x01]));
        assert!(out.is_empty());
    }

    #[test]
    fn info_writes_report_lines_without_reply() {
        let mut collector = Collector::new(true);
        let mut out = Vec::new();
        assert_eq!(collector.handle(&msg(info(0xAA, 141)), &mut out), None);
        assert_eq!(collector.handle(&msg(info(0x01, 100)), &mut out), None);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "170;1;35.00;1;1\n1;1;25.00;1;0\n"
        );
        assert_eq!(collector.stats().map(|s| s.node_count()), Some(2));
    }

    #[test]
    fn garbage_is_dropped_silently() {
        let mut collector = Collector::new(false);
        let mut out = Vec::new();
        assert_eq!(collector.handle(&msg(vec![0x55, 0x01]), &mut out), None);
        assert_eq!(collector.handle(&msg(vec![0xFF; 8]), &mut out), None);
        assert!(out.is_empty());
        assert!(collector.stats().is_none());
        assert!(collector.summary().is_empty());
    }

    #[test]
    fn summary_lists_nodes_in_id_order() {
        let mut collector = Collector::new(true);
        let mut out = Vec::new();
        collector.handle(&msg(info(0xAA, 141)), &mut out);
        collector.handle(&msg(info(0x01, 100)), &mut out);
        collector.handle(&msg(info(0x01, 108)), &mut out);

        let summary = collector.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0],
            "Nó 1: 2 amostras | média 26.00°C / 78.80°F | alarme OFF"
        );
        assert_eq!(
            summary[1],
            "Nó 170: 1 amostras | média 35.00°C / 95.00°F | alarme ON"
        );
    }
}
