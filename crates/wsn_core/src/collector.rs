//! Lado do coletor (root): responde registros e transforma frames INFO em
//! registros de telemetria.

use crate::fixed_point::decode_q12_4_to_decimal;
use crate::protocol::{Frame, InfoFrame, ProtocolError};
use crate::registration::answer_request;
use crate::types::{NodeId, RegistrationStatus, Unit};
use std::fmt;
use tracing::{debug, info};

/// Telemetria decodificada de um frame INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryReport {
    pub node_id: NodeId,
    pub unit: Unit,
    /// Parte inteira da temperatura.
    pub integer: u32,
    /// Centésimos (00–99).
    pub hundredths: u32,
    pub alarm_kind: u8,
    pub alarm_state: bool,
}

impl TelemetryReport {
    pub fn from_info(info: &InfoFrame) -> Self {
        let (integer, hundredths) = decode_q12_4_to_decimal(info.temp_q12_4);
        Self {
            node_id: info.node_id,
            unit: info.unit,
            integer,
            hundredths,
            alarm_kind: info.alarm_kind,
            alarm_state: info.alarm_state,
        }
    }

    /// Valor de exibição na unidade do frame.
    pub fn value(&self) -> f64 {
        f64::from(self.integer) + f64::from(self.hundredths) / 100.0
    }
}

/// Linha `ID;Unidade;Temp;ID_alarme;Estado`.
impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{}.{:02};{};{}",
            self.node_id,
            self.unit.wire(),
            self.integer,
            self.hundredths,
            self.alarm_kind,
            u8::from(self.alarm_state)
        )
    }
}

/// O que fazer com um datagrama recebido pelo coletor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorAction {
    /// Responder à origem com estes bytes (`REGISTER_ACK`).
    Reply(Vec<u8>),
    /// Telemetria para reportar. Não há resposta.
    Report(TelemetryReport),
    /// Frame válido sem efeito no coletor.
    Ignore,
}

/// Trata um datagrama recebido pelo coletor.
///
/// Erros de decodificação são devolvidos para log; o chamador simplesmente
/// descarta o datagrama.
pub fn handle_datagram(data: &[u8]) -> Result<CollectorAction, ProtocolError> {
    let action = match Frame::decode(data)? {
        Frame::RegisterRequest { node_id } => {
            let ack = answer_request(node_id);
            if let Frame::RegisterAck { status, .. } = ack {
                info!(
                    "RX REG_REQ do nó {node_id} -> {}",
                    match status {
                        RegistrationStatus::Accepted => "OK",
                        RegistrationStatus::Rejected => "NO OK",
                    }
                );
            }
            CollectorAction::Reply(ack.encode())
        }
        Frame::Info(info) => CollectorAction::Report(TelemetryReport::from_info(&info)),
        Frame::RegisterAck { node_id, .. } => {
            debug!("REG_ACK do nó {node_id} ignorado pelo coletor");
            CollectorAction::Ignore
        }
    };
    Ok(action)
}
