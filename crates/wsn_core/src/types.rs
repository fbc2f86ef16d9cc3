//! Tipos de domínio compartilhados entre sensor e coletor.
//!
//! Todos os valores de temperatura trafegam como inteiros: leitura bruta em
//! quartos de grau Celsius e Q12.4 (graus × 16) no fio.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identificador de 8 bits de um nó sensor.
pub type NodeId = u8;

/// Leitura bruta do sensor em quartos de grau Celsius (`raw / 4 = °C`).
pub type RawTemperature = i16;

/// Temperatura em ponto fixo Q12.4: 12 bits inteiros, 4 fracionários.
///
/// No fio vai o valor bruto (`to_bits`), graus × 16 em big-endian.
pub type Q12_4 = fixed::types::U12F4;

/// Identificador reservado, nunca aceito no registro.
pub const NODE_ID_RESERVED_LOW: NodeId = 0x00;
/// Identificador reservado (broadcast), nunca aceito no registro.
pub const NODE_ID_RESERVED_HIGH: NodeId = 0xFF;

// ──────────────────────────────────────────────
// Unidade
// ──────────────────────────────────────────────

/// Unidade selecionada para codificação da temperatura.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Unit {
    /// Byte da unidade no frame INFO.
    pub const fn wire(self) -> u8 {
        match self {
            Unit::Celsius => 0x01,
            Unit::Fahrenheit => 0x02,
        }
    }

    /// Interpreta o byte de unidade. `None` para valores desconhecidos.
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Unit::Celsius),
            0x02 => Some(Unit::Fahrenheit),
            _ => None,
        }
    }

    /// Alterna entre Celsius e Fahrenheit (botão).
    pub const fn toggled(self) -> Self {
        match self {
            Unit::Celsius => Unit::Fahrenheit,
            Unit::Fahrenheit => Unit::Celsius,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ──────────────────────────────────────────────
// Registro
// ──────────────────────────────────────────────

/// Estado de registro de um nó sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationState {
    #[default]
    Unregistered,
    Registered,
}

impl RegistrationState {
    pub const fn is_registered(self) -> bool {
        matches!(self, RegistrationState::Registered)
    }
}

/// Resultado da admissão enviado no `REGISTER_ACK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Accepted,
    Rejected,
}

impl RegistrationStatus {
    pub const fn wire(self) -> u8 {
        match self {
            RegistrationStatus::Accepted => 0x01,
            RegistrationStatus::Rejected => 0x00,
        }
    }

    /// Apenas `0x01` significa aceito; qualquer outro byte é rejeição.
    pub const fn from_wire(byte: u8) -> Self {
        if byte == 0x01 {
            RegistrationStatus::Accepted
        } else {
            RegistrationStatus::Rejected
        }
    }

    pub const fn is_accepted(self) -> bool {
        matches!(self, RegistrationStatus::Accepted)
    }
}
