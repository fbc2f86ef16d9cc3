//! # WSN Core
//!
//! Crate compartilhada com o protocolo de registro + telemetria entre nós
//! sensores e o coletor (root) da rede.
//!
//! ## Módulos
//! - [`types`] – Identidade do nó, unidade, estados de registro
//! - [`fixed_point`] – Conversões leitura bruta ↔ Q12.4
//! - [`protocol`] – Encode/decode dos frames com start marker
//! - [`registration`] – Máquina de estados do registro e admissão
//! - [`alarm`] – Threshold de temperatura e comando do LED
//! - [`timer`] – Timers periódicos e ticks do nó
//! - [`node`] – Driver de eventos do nó sensor
//! - [`collector`] – Tratamento de datagramas no root
//! - [`stats`] – Médias por nó no coletor
//! - [`config`] – Configuração unificada via TOML
//! - [`traits`] – Colaboradores externos (roteamento, sensor, LED, socket)

pub mod types;
pub mod fixed_point;
pub mod protocol;
pub mod registration;
pub mod alarm;
pub mod timer;
pub mod node;
pub mod collector;
pub mod stats;
pub mod config;
pub mod traits;

// Re-exports convenientes
pub use types::{NodeId, RawTemperature, Unit};
pub use protocol::{Frame, InfoFrame, ProtocolError};
pub use node::{Event, SensorNode};
pub use config::{AppConfig, CollectorConfig, SensorConfig};
