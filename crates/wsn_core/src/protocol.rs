//! Protocolo binário de registro + telemetria.
//!
//! Formato dos frames (temperatura em big-endian):
//!
//! ```text
//! ┌──────────┬─────────┬─────────┬──────────────┬───────────┬──────────┬──────────┐
//! │ Start(1) │ Tipo(1) │ Nó(1)   │ Status/Un(1) │ Temp Q12.4│ Alarme(1)│ Estado(1)│
//! │ 0x55     │         │         │              │ (2, BE)   │          │          │
//! └──────────┴─────────┴─────────┴──────────────┴───────────┴──────────┴──────────┘
//! ```
//!
//! - `REGISTER_REQUEST` (0x10): 3 bytes
//! - `REGISTER_ACK` (0x11): 4 bytes
//! - `INFO` (0x01): 8 bytes
//!
//! Qualquer erro de decodificação é descartado silenciosamente pelos receptores.

use crate::types::{NodeId, Q12_4, RegistrationStatus, Unit};

/// Byte inicial de todo frame.
pub const START_MARKER: u8 = 0x55;

pub const FRAME_INFO: u8 = 0x01;
pub const FRAME_REGISTER_REQUEST: u8 = 0x10;
pub const FRAME_REGISTER_ACK: u8 = 0x11;

/// Tipo de alarme transportado no INFO (só existe o de temperatura).
pub const ALARM_KIND_TEMPERATURE: u8 = 0x01;

/// Tamanho mínimo para ler start + tipo.
const HEADER_SIZE: usize = 2;

pub const REGISTER_REQUEST_LEN: usize = 3;
pub const REGISTER_ACK_LEN: usize = 4;
pub const INFO_LEN: usize = 8;

/// Maior frame do protocolo.
pub const MAX_FRAME_LEN: usize = INFO_LEN;

/// Erros do protocolo.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Frame muito curto ({len} bytes, mínimo {min})")]
    TooShort { len: usize, min: usize },

    #[error("Start marker inválido: 0x{0:02X} (esperado 0x{START_MARKER:02X})")]
    InvalidStart(u8),

    #[error("Tipo de frame desconhecido: 0x{0:02X}")]
    UnknownType(u8),

    #[error("Unidade desconhecida: 0x{0:02X}")]
    UnknownUnit(u8),
}

/// Frame INFO com a telemetria de um nó.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoFrame {
    pub node_id: NodeId,
    pub unit: Unit,
    pub temp_q12_4: Q12_4,
    pub alarm_kind: u8,
    pub alarm_state: bool,
}

/// Frames do protocolo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    RegisterRequest {
        node_id: NodeId,
    },
    RegisterAck {
        node_id: NodeId,
        status: RegistrationStatus,
    },
    Info(InfoFrame),
}

impl Frame {
    /// Byte de tipo do frame.
    pub const fn type_byte(&self) -> u8 {
        match self {
            Frame::RegisterRequest { .. } => FRAME_REGISTER_REQUEST,
            Frame::RegisterAck { .. } => FRAME_REGISTER_ACK,
            Frame::Info(_) => FRAME_INFO,
        }
    }

    pub const fn node_id(&self) -> NodeId {
        match self {
            Frame::RegisterRequest { node_id } | Frame::RegisterAck { node_id, .. } => *node_id,
            Frame::Info(info) => info.node_id,
        }
    }

    /// Serializa o frame para envio UDP.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(MAX_FRAME_LEN);
        frame.push(START_MARKER);
        frame.push(self.type_byte());

        match self {
            Frame::RegisterRequest { node_id } => {
                frame.push(*node_id);
            }
            Frame::RegisterAck { node_id, status } => {
                frame.push(*node_id);
                frame.push(status.wire());
            }
            Frame::Info(info) => {
                frame.push(info.node_id);
                frame.push(info.unit.wire());
                frame.extend_from_slice(&info.temp_q12_4.to_bits().to_be_bytes());
                frame.push(info.alarm_kind);
                frame.push(u8::from(info.alarm_state));
            }
        }

        frame
    }

    /// Decodifica um datagrama recebido.
    ///
    /// Valida start marker e o tamanho mínimo do tipo antes de ler o payload.
    /// Bytes extras no fim são ignorados.
    pub fn decode(data: &[u8]) -> Result<Frame, ProtocolError> {
        if data.len() < HEADER_SIZE {
            return Err(ProtocolError::TooShort {
                len: data.len(),
                min: HEADER_SIZE,
            });
        }

        let start = data[0];
        if start != START_MARKER {
            return Err(ProtocolError::InvalidStart(start));
        }

        let frame_type = data[1];
        let min = match frame_type {
            FRAME_REGISTER_REQUEST => REGISTER_REQUEST_LEN,
            FRAME_REGISTER_ACK => REGISTER_ACK_LEN,
            FRAME_INFO => INFO_LEN,
            other => return Err(ProtocolError::UnknownType(other)),
        };
        if data.len() < min {
            return Err(ProtocolError::TooShort {
                len: data.len(),
                min,
            });
        }

        let node_id = data[2];
        let frame = match frame_type {
            FRAME_REGISTER_REQUEST => Frame::RegisterRequest { node_id },
            FRAME_REGISTER_ACK => Frame::RegisterAck {
                node_id,
                status: RegistrationStatus::from_wire(data[3]),
            },
            _ => {
                let unit = Unit::from_wire(data[3]).ok_or(ProtocolError::UnknownUnit(data[3]))?;
                Frame::Info(InfoFrame {
                    node_id,
                    unit,
                    temp_q12_4: Q12_4::from_bits(u16::from_be_bytes([data[4], data[5]])),
                    alarm_kind: data[6],
                    alarm_state: data[7] != 0,
                })
            }
        };

        Ok(frame)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
