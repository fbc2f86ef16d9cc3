//! Driver do nó sensor.
//!
//! Um único laço de eventos chama [`SensorNode::dispatch`] para cada tick,
//! botão ou datagrama. Como não há preempção entre dispatches, o contexto
//! compartilhado não precisa de lock: cada campo tem um único escritor.

use crate::alarm::{IndicatorCommand, alarm_for_raw, indicator_command};
use crate::protocol::{ALARM_KIND_TEMPERATURE, Frame, InfoFrame};
use crate::registration::{AckOutcome, Registration};
use crate::timer::Tick;
use crate::traits::{Indicator, Routing, TemperatureSensor, Transport};
use crate::types::{NodeId, RawTemperature, Unit};
use tracing::{debug, error, info};

/// Eventos entregues ao nó.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick(Tick),
    ButtonPressed,
    Datagram(Vec<u8>),
}

/// Estado compartilhado entre as tarefas do nó.
#[derive(Debug, Clone)]
pub struct NodeContext {
    /// Última leitura bruta. Escrito apenas pela medição.
    pub last_reading: Option<RawTemperature>,
    /// Alarme derivado da última leitura. Escrito apenas pela medição.
    pub alarm: bool,
    /// Unidade de envio. Escrito apenas pelo botão.
    pub unit: Unit,
    /// Escrito apenas pela rede (acks).
    pub registration: Registration,
}

impl NodeContext {
    pub fn new(node_id: NodeId, unit: Unit) -> Self {
        Self {
            last_reading: None,
            alarm: false,
            unit,
            registration: Registration::new(node_id),
        }
    }
}

/// Nó sensor com seus colaboradores.
pub struct SensorNode<R, S, I, T> {
    ctx: NodeContext,
    routing: R,
    sensor: S,
    indicator: I,
    transport: T,
}

impl<R, S, I, T> SensorNode<R, S, I, T>
where
    R: Routing,
    S: TemperatureSensor,
    I: Indicator,
    T: Transport,
{
    /// Cria o nó não registrado e com o LED apagado.
    pub fn new(
        node_id: NodeId,
        unit: Unit,
        routing: R,
        sensor: S,
        mut indicator: I,
        transport: T,
    ) -> Self {
        indicator.off();
        Self {
            ctx: NodeContext::new(node_id, unit),
            routing,
            sensor,
            indicator,
            transport,
        }
    }

    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    pub fn node_id(&self) -> NodeId {
        self.ctx.registration.node_id()
    }

    pub fn routing_mut(&mut self) -> &mut R {
        &mut self.routing
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Ponto único de entrada dos eventos.
    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::Tick(Tick::Registration) => self.on_registration_tick(),
            Event::Tick(Tick::Measure) => self.on_measure_tick(),
            Event::Tick(Tick::Send) => self.on_send_tick(),
            Event::Tick(Tick::Indicator) => self.on_indicator_tick(),
            Event::ButtonPressed => self.on_button(),
            Event::Datagram(data) => self.on_datagram(&data),
        }
    }

    fn on_registration_tick(&mut self) {
        let reachable = self.routing.is_root_reachable();
        debug!(
            "reachable={} registered={}",
            reachable,
            self.ctx.registration.is_registered()
        );
        if let Some(frame) = self.ctx.registration.on_check_tick(reachable) {
            info!("TX REG_REQ (nó {})", self.node_id());
            self.send(&frame);
        }
    }

    fn on_measure_tick(&mut self) {
        let raw = self.sensor.read_raw_temperature();
        let alarm = alarm_for_raw(raw);
        if alarm != self.ctx.alarm {
            info!(
                "Alarme {} (raw {raw} = {:.2}°C)",
                if alarm { "ATIVO" } else { "normal" },
                f32::from(raw) / 4.0
            );
        }
        self.ctx.last_reading = Some(raw);
        self.ctx.alarm = alarm;
    }

    fn on_send_tick(&mut self) {
        if !self.ctx.registration.is_registered() {
            debug!("Nó não registrado, INFO não enviado");
            return;
        }
        let Some(raw) = self.ctx.last_reading else {
            debug!("Nenhuma leitura ainda, INFO adiado");
            return;
        };

        let info = InfoFrame {
            node_id: self.node_id(),
            unit: self.ctx.unit,
            temp_q12_4: self.ctx.unit.encode(raw),
            alarm_kind: ALARM_KIND_TEMPERATURE,
            alarm_state: self.ctx.alarm,
        };
        info!(
            "TX INFO (unit={} alarm={})",
            info.unit.wire(),
            u8::from(info.alarm_state)
        );
        self.send(&Frame::Info(info));
    }

    fn on_indicator_tick(&mut self) {
        match indicator_command(self.ctx.alarm) {
            IndicatorCommand::Toggle => self.indicator.toggle(),
            IndicatorCommand::Off => self.indicator.off(),
        }
    }

    fn on_button(&mut self) {
        self.ctx.unit = self.ctx.unit.toggled();
        info!("Botão → unidade {} ({})", self.ctx.unit.wire(), self.ctx.unit);
    }

    fn on_datagram(&mut self, data: &[u8]) {
        match Frame::decode(data) {
            Ok(Frame::RegisterAck { node_id, status }) => {
                if self.ctx.registration.on_ack(node_id, status) == AckOutcome::Rejected {
                    info!("Novo pedido de registro no próximo tick");
                }
            }
            Ok(other) => debug!("Frame 0x{:02X} ignorado pelo sensor", other.type_byte()),
            Err(e) => debug!("Datagrama descartado: {e}"),
        }
    }

    /// Envia um frame ao root. Root inalcançável não é erro: só pula o envio.
    fn send(&mut self, frame: &Frame) {
        if !self.routing.is_root_reachable() {
            info!("Root inalcançável");
            return;
        }
        let Some(dst) = self.routing.root_address() else {
            info!("Endereço do root desconhecido");
            return;
        };

        match self.transport.send_to(dst, &frame.encode()) {
            Ok(sent) => debug!("→ {sent} bytes para {dst}"),
            Err(e) => error!("Erro ao enviar UDP para {dst}: {e}"),
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::{celsius_to_q12_4, fahrenheit_to_q12_4};
    use crate::protocol::FRAME_INFO;
    use crate::types::RegistrationStatus;
    use std::collections::VecDeque;
    use std::io;
    use std::net::SocketAddr;

    struct FakeRouting {
        reachable: bool,
        root: SocketAddr,
    }

    impl Routing for FakeRouting {
        fn is_root_reachable(&self) -> bool {
            self.reachable
        }

        fn root_address(&self) -> Option<SocketAddr> {
            self.reachable.then_some(self.root)
        }
    }

    struct ScriptedSensor(VecDeque<RawTemperature>);

    impl TemperatureSensor for ScriptedSensor {
        fn read_raw_temperature(&mut self) -> RawTemperature {
            let raw = self.0.pop_front().unwrap_or(100);
            self.0.push_back(raw);
            raw
        }
    }

    #[derive(Default)]
    struct FakeLed {
        lit: bool,
        toggles: usize,
    }

    impl Indicator for FakeLed {
        fn on(&mut self) {
            self.lit = true;
        }
        fn off(&mut self) {
            self.lit = false;
        }
        fn toggle(&mut self) {
            self.lit = !self.lit;
            self.toggles += 1;
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Vec<(SocketAddr, Vec<u8>)>,
        fail: bool,
    }

    impl Transport for RecordingTransport {
        fn send_to(&mut self, dst: SocketAddr, frame: &[u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::other("link down"));
            }
            self.sent.push((dst, frame.to_vec()));
            Ok(frame.len())
        }
    }

    type TestNode = SensorNode<FakeRouting, ScriptedSensor, FakeLed, RecordingTransport>;

    fn root() -> SocketAddr {
        "127.0.0.1:5678".parse().unwrap()
    }

    fn node_with(readings: &[RawTemperature], reachable: bool) -> TestNode {
        SensorNode::new(
            0xAA,
            Unit::Celsius,
            FakeRouting {
                reachable,
                root: root(),
            },
            ScriptedSensor(readings.iter().copied().collect()),
            FakeLed::default(),
            RecordingTransport::default(),
        )
    }

    fn ack(node_id: NodeId, status: RegistrationStatus) -> Event {
        Event::Datagram(Frame::RegisterAck { node_id, status }.encode())
    }

    fn info_frames(node: &TestNode) -> Vec<InfoFrame> {
        node.transport()
            .sent
            .iter()
            .filter_map(|(_, bytes)| match Frame::decode(bytes) {
                Ok(Frame::Info(info)) => Some(info),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn registration_tick_sends_request_when_reachable() {
        let mut node = node_with(&[100], true);
        node.dispatch(Event::Tick(Tick::Registration));
        assert_eq!(node.transport().sent, vec![(root(), vec![0x55, 0x10, 0xAA])]);
        assert!(!node.context().registration.is_registered());
    }

    #[test]
    fn unreachable_root_skips_everything() {
        let mut node = node_with(&[100], false);
        node.dispatch(Event::Tick(Tick::Registration));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Send));
        assert!(node.transport().sent.is_empty());
    }

    #[test]
    fn full_handshake_then_info() {
        let mut node = node_with(&[141], true);
        node.dispatch(Event::Tick(Tick::Registration));
        node.dispatch(ack(0xAA, RegistrationStatus::Accepted));
        assert!(node.context().registration.is_registered());

        node.dispatch(Event::Tick(Tick::Registration));
        assert_eq!(node.transport().sent.len(), 1, "registrado não pede de novo");

        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Send));
        let infos = info_frames(&node);
        assert_eq!(
            infos,
            vec![InfoFrame {
                node_id: 0xAA,
                unit: Unit::Celsius,
                temp_q12_4: celsius_to_q12_4(141),
                alarm_kind: ALARM_KIND_TEMPERATURE,
                alarm_state: true,
            }]
        );
    }

    #[test]
    fn send_without_reading_is_skipped() {
        let mut node = node_with(&[100], true);
        node.dispatch(ack(0xAA, RegistrationStatus::Accepted));
        node.dispatch(Event::Tick(Tick::Send));
        assert!(info_frames(&node).is_empty());
    }

    #[test]
    fn send_reuses_latest_reading() {
        let mut node = node_with(&[120, 150], true);
        node.dispatch(ack(0xAA, RegistrationStatus::Accepted));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Send));
        node.dispatch(Event::Tick(Tick::Send));
        let infos = info_frames(&node);
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.temp_q12_4 == celsius_to_q12_4(150)));
        assert!(infos.iter().all(|i| i.alarm_state));
    }

    #[test]
    fn button_switches_encoding_only() {
        let mut node = node_with(&[140], true);
        node.dispatch(ack(0xAA, RegistrationStatus::Accepted));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::ButtonPressed);
        node.dispatch(Event::Tick(Tick::Send));

        let infos = info_frames(&node);
        assert_eq!(infos[0].unit, Unit::Fahrenheit);
        assert_eq!(infos[0].temp_q12_4, fahrenheit_to_q12_4(140));
        // 140 = 35.0 °C, exatamente no limite
        assert!(!infos[0].alarm_state);
        assert_eq!(node.context().last_reading, Some(140));
    }

    #[test]
    fn foreign_and_rejected_acks_keep_node_silent() {
        let mut node = node_with(&[150], true);
        node.dispatch(ack(0xAB, RegistrationStatus::Accepted));
        node.dispatch(ack(0xAA, RegistrationStatus::Rejected));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Send));
        assert!(info_frames(&node).is_empty());
    }

    #[test]
    fn rejection_after_registration_stops_info() {
        let mut node = node_with(&[100], true);
        node.dispatch(ack(0xAA, RegistrationStatus::Accepted));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Send));
        node.dispatch(ack(0xAA, RegistrationStatus::Rejected));
        node.dispatch(Event::Tick(Tick::Send));
        assert_eq!(info_frames(&node).len(), 1);

        node.dispatch(Event::Tick(Tick::Registration));
        let (_, last) = node.transport().sent.last().unwrap();
        assert_eq!(last, &vec![0x55, 0x10, 0xAA]);
    }

    #[test]
    fn malformed_datagrams_are_dropped() {
        let mut node = node_with(&[100], true);
        node.dispatch(Event::Datagram(vec![0x55, 0x11, 0xAA]));
        node.dispatch(Event::Datagram(vec![0x00, 0x11, 0xAA, 0x01]));
        node.dispatch(Event::Datagram(vec![]));
        assert!(!node.context().registration.is_registered());
    }

    #[test]
    fn no_info_while_unregistered_for_any_tick_sequence() {
        let events = [
            Event::Tick(Tick::Registration),
            Event::Tick(Tick::Measure),
            Event::Tick(Tick::Send),
            Event::Tick(Tick::Indicator),
            Event::ButtonPressed,
            ack(0xAB, RegistrationStatus::Accepted),
            ack(0xAA, RegistrationStatus::Rejected),
            Event::Datagram(vec![0x55, 0x11, 0xAA]),
        ];

        // Sequência pseudo-aleatória determinística (LCG)
        let mut seed: u32 = 0x1234_5678;
        for reachable in [true, false] {
            let mut node = node_with(&[100, 139, 141, 200], reachable);
            for _ in 0..2_000 {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let event = events[(seed >> 16) as usize % events.len()].clone();
                node.dispatch(event);
                assert!(!node.context().registration.is_registered());
            }
            assert!(
                node.transport()
                    .sent
                    .iter()
                    .all(|(_, bytes)| bytes[1] != FRAME_INFO)
            );
        }
    }

    #[test]
    fn indicator_blinks_only_while_alarm() {
        let mut node = node_with(&[150, 150, 100], true);
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Indicator));
        node.dispatch(Event::Tick(Tick::Indicator));
        node.dispatch(Event::Tick(Tick::Indicator));
        assert_eq!(node.indicator().toggles, 3);
        assert!(node.indicator().lit);

        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Measure));
        node.dispatch(Event::Tick(Tick::Indicator));
        assert!(!node.indicator().lit);
        assert_eq!(node.indicator().toggles, 3);
    }

    #[test]
    fn send_failure_is_not_fatal() {
        let mut node = node_with(&[100], true);
        node.routing_mut().reachable = true;
        node.transport.fail = true;
        node.dispatch(Event::Tick(Tick::Registration));
        node.transport.fail = false;
        node.dispatch(Event::Tick(Tick::Registration));
        assert_eq!(node.transport().sent.len(), 1);
    }
}
