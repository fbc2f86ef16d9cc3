//! Configuração unificada via TOML.
//!
//! Um único `config.toml` para os dois papéis: `[sensor]` e `[collector]`.

use crate::types::{NODE_ID_RESERVED_HIGH, NODE_ID_RESERVED_LOW, NodeId, RawTemperature, Unit};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Porta UDP padrão em que o coletor escuta.
pub const DEFAULT_COLLECTOR_PORT: u16 = 5678;
/// Porta UDP padrão do nó sensor.
pub const DEFAULT_SENSOR_PORT: u16 = 8765;

/// Faixa aceita para intervalos em segundos.
pub const INTERVAL_SECS_RANGE: RangeInclusive<f64> = 0.1..=3600.0;
/// Faixa aceita para o período do LED (ms).
pub const INDICATOR_MS_RANGE: RangeInclusive<u64> = 10..=60_000;

const DEFAULT_REGISTER_SECS: f64 = 2.0;
const DEFAULT_MEASURE_SECS: f64 = 2.0;
const DEFAULT_SEND_SECS: f64 = 5.0;
const DEFAULT_INDICATOR_MS: u64 = 500;
const DEFAULT_ANNOUNCE_SECS: f64 = 5.0;

/// Intervalo em segundos, ou o padrão quando fora de [`INTERVAL_SECS_RANGE`].
///
/// Negativo, NaN ou infinito nunca chegam a `Duration::from_secs_f64`.
fn interval_or_default(name: &str, secs: f64, default_secs: f64) -> Duration {
    if INTERVAL_SECS_RANGE.contains(&secs) {
        Duration::from_secs_f64(secs)
    } else {
        warn!("{name} inválido ({secs}), usando {default_secs}s");
        Duration::from_secs_f64(default_secs)
    }
}

/// Erros de configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de I/O em {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Erro ao serializar configuração: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Fonte das leituras de temperatura do sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorSource {
    /// Onda triangular determinística em torno de `sim_base_raw`.
    #[default]
    Simulated,
    /// Componente mais quente reportado pelo host.
    Host,
}

/// Configuração do nó sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Identificador do nó (0x01–0xFE)
    pub node_id: NodeId,
    /// Endereço do root/coletor
    pub collector_addr: String,
    /// IP local para bind (vazio = todas as interfaces)
    pub bind_ip: String,
    /// Porta UDP local
    pub port: u16,
    /// Intervalo de verificação de registro (segundos)
    pub register_interval_secs: f64,
    /// Intervalo de leitura do sensor (segundos)
    pub measure_interval_secs: f64,
    /// Intervalo de envio do INFO (segundos)
    pub send_interval_secs: f64,
    /// Período do LED de alarme (ms)
    pub indicator_interval_ms: u64,
    /// Unidade inicial
    pub unit: Unit,
    /// Fonte das leituras
    pub source: SensorSource,
    /// Centro da onda simulada (quartos de grau)
    pub sim_base_raw: RawTemperature,
    /// Amplitude da onda simulada (quartos de grau)
    pub sim_swing_raw: RawTemperature,
    /// Passo por leitura simulada (quartos de grau)
    pub sim_step_raw: RawTemperature,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            node_id: 0xAA,
            collector_addr: format!("127.0.0.1:{DEFAULT_COLLECTOR_PORT}"),
            bind_ip: String::new(),
            port: DEFAULT_SENSOR_PORT,
            register_interval_secs: DEFAULT_REGISTER_SECS,
            measure_interval_secs: DEFAULT_MEASURE_SECS,
            send_interval_secs: DEFAULT_SEND_SECS,
            indicator_interval_ms: DEFAULT_INDICATOR_MS,
            unit: Unit::Celsius,
            source: SensorSource::Simulated,
            sim_base_raw: 120,
            sim_swing_raw: 40,
            sim_step_raw: 4,
        }
    }
}

impl SensorConfig {
    pub fn register_interval(&self) -> Duration {
        interval_or_default(
            "register_interval_secs",
            self.register_interval_secs,
            DEFAULT_REGISTER_SECS,
        )
    }

    pub fn measure_interval(&self) -> Duration {
        interval_or_default(
            "measure_interval_secs",
            self.measure_interval_secs,
            DEFAULT_MEASURE_SECS,
        )
    }

    pub fn send_interval(&self) -> Duration {
        interval_or_default("send_interval_secs", self.send_interval_secs, DEFAULT_SEND_SECS)
    }

    pub fn indicator_interval(&self) -> Duration {
        if INDICATOR_MS_RANGE.contains(&self.indicator_interval_ms) {
            Duration::from_millis(self.indicator_interval_ms)
        } else {
            warn!(
                "indicator_interval_ms inválido ({}), usando {DEFAULT_INDICATOR_MS} ms",
                self.indicator_interval_ms
            );
            Duration::from_millis(DEFAULT_INDICATOR_MS)
        }
    }

    /// Endereço do coletor, se parseável.
    pub fn collector_socket_addr(&self) -> Option<SocketAddr> {
        self.collector_addr.parse().ok()
    }
}

/// Configuração do coletor (root).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// IP local para bind (vazio = todas as interfaces)
    pub bind_ip: String,
    /// Porta UDP para escutar
    pub port: u16,
    /// Intervalo para anunciar o endereço do root (segundos)
    pub announce_interval_secs: f64,
    /// Mantém médias por nó
    pub stats_enabled: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bind_ip: String::new(),
            port: DEFAULT_COLLECTOR_PORT,
            announce_interval_secs: DEFAULT_ANNOUNCE_SECS,
            stats_enabled: true,
        }
    }
}

impl CollectorConfig {
    pub fn announce_interval(&self) -> Duration {
        interval_or_default(
            "announce_interval_secs",
            self.announce_interval_secs,
            DEFAULT_ANNOUNCE_SECS,
        )
    }
}

/// Endereço de bind `ip:porta`, com `0.0.0.0` quando o IP está vazio.
pub fn bind_addr(bind_ip: &str, port: u16) -> String {
    if bind_ip.is_empty() {
        format!("0.0.0.0:{port}")
    } else {
        format!("{bind_ip}:{port}")
    }
}

/// Configuração raiz do aplicativo (unifica sensor e coletor).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub collector: CollectorConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let sensor = &self.sensor;
        let collector = &self.collector;

        if sensor.node_id == NODE_ID_RESERVED_LOW || sensor.node_id == NODE_ID_RESERVED_HIGH {
            errors.push(format!(
                "node_id 0x{:02X} é reservado e sempre será rejeitado",
                sensor.node_id
            ));
        }
        if sensor.collector_socket_addr().is_none() {
            errors.push(format!(
                "Endereço do coletor inválido: {:?}",
                sensor.collector_addr
            ));
        }
        if sensor.port == 0 {
            errors.push("Porta do sensor não pode ser 0".into());
        }
        for (name, secs) in [
            ("register_interval_secs", sensor.register_interval_secs),
            ("measure_interval_secs", sensor.measure_interval_secs),
            ("send_interval_secs", sensor.send_interval_secs),
        ] {
            if !INTERVAL_SECS_RANGE.contains(&secs) {
                errors.push(format!("Intervalo {name} inválido: {secs} (0.1–3600.0)"));
            }
        }
        if !INDICATOR_MS_RANGE.contains(&sensor.indicator_interval_ms) {
            errors.push(format!(
                "Intervalo do LED inválido: {} ms (10–60000)",
                sensor.indicator_interval_ms
            ));
        }
        if sensor.sim_swing_raw < 0 || sensor.sim_step_raw <= 0 {
            errors.push("Onda simulada precisa de amplitude >= 0 e passo > 0".into());
        }

        if collector.port == 0 {
            errors.push("Porta do coletor não pode ser 0".into());
        }
        if !INTERVAL_SECS_RANGE.contains(&collector.announce_interval_secs) {
            errors.push(format!(
                "Intervalo de anúncio inválido: {} (0.1–3600.0)",
                collector.announce_interval_secs
            ));
        }
        if sensor.port == collector.port && sensor.bind_ip == collector.bind_ip {
            errors.push(format!(
                "Sensor e coletor não podem usar a mesma porta {} no mesmo IP",
                sensor.port
            ));
        }

        errors
    }
}
