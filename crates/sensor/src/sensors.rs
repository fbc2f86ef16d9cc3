//! Fontes de temperatura do nó.
//!
//! - `Simulated` — onda triangular determinística, cruza o limite de alarme
//! - `Host` — `sysinfo`, componente mais quente do host

use sysinfo::Components;
use tracing::{info, warn};
use wsn_core::config::{SensorConfig, SensorSource};
use wsn_core::traits::TemperatureSensor;
use wsn_core::types::RawTemperature;

/// Leituras acima disso são descartadas como lixo do driver.
const MAX_PLAUSIBLE_CELSIUS: f32 = 150.0;

/// Sensor escolhido pela configuração.
pub enum NodeSensor {
    Simulated(SimulatedSensor),
    Host(HostSensor),
}

impl NodeSensor {
    pub fn from_config(cfg: &SensorConfig) -> Self {
        match cfg.source {
            SensorSource::Simulated => {
                info!(
                    "Sensor simulado: {} ± {} (passo {})",
                    cfg.sim_base_raw, cfg.sim_swing_raw, cfg.sim_step_raw
                );
                NodeSensor::Simulated(SimulatedSensor::new(
                    cfg.sim_base_raw,
                    cfg.sim_swing_raw,
                    cfg.sim_step_raw,
                ))
            }
            SensorSource::Host => NodeSensor::Host(HostSensor::new()),
        }
    }
}

impl TemperatureSensor for NodeSensor {
    fn read_raw_temperature(&mut self) -> RawTemperature {
        match self {
            NodeSensor::Simulated(s) => s.read_raw_temperature(),
            NodeSensor::Host(s) => s.read_raw_temperature(),
        }
    }
}

// ──────────────────────────────────────────
// Simulado
// ──────────────────────────────────────────

/// Onda triangular entre `base - swing` e `base + swing`.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    low: RawTemperature,
    high: RawTemperature,
    step: RawTemperature,
    current: RawTemperature,
    rising: bool,
}

impl SimulatedSensor {
    pub fn new(base: RawTemperature, swing: RawTemperature, step: RawTemperature) -> Self {
        let swing = swing.max(0);
        let low = base.saturating_sub(swing);
        Self {
            low,
            high: base.saturating_add(swing),
            step: step.max(1),
            current: low,
            rising: true,
        }
    }
}

impl TemperatureSensor for SimulatedSensor {
    fn read_raw_temperature(&mut self) -> RawTemperature {
        let raw = self.current;
        if self.rising {
            self.current = self.current.saturating_add(self.step).min(self.high);
            if self.current == self.high {
                self.rising = false;
            }
        } else {
            self.current = self.current.saturating_sub(self.step).max(self.low);
            if self.current == self.low {
                self.rising = true;
            }
        }
        raw
    }
}

// ──────────────────────────────────────────
// Host (sysinfo)
// ──────────────────────────────────────────

/// Temperatura do componente mais quente visto pelo `sysinfo`.
pub struct HostSensor {
    components: Components,
    last: RawTemperature,
    warned: bool,
}

impl HostSensor {
    pub fn new() -> Self {
        let components = Components::new_with_refreshed_list();
        if components.iter().next().is_none() {
            warn!("✗ Nenhum sensor térmico visível no host");
        } else {
            info!("✓ Sensores térmicos do host:");
            for comp in components.iter() {
                info!("  {}", comp.label());
            }
        }
        Self {
            components,
            last: 0,
            warned: false,
        }
    }

    fn hottest_celsius(&self) -> Option<f32> {
        self.components
            .iter()
            .filter_map(|c| c.temperature())
            .filter(|t| t.is_finite() && *t < MAX_PLAUSIBLE_CELSIUS)
            .fold(None, |acc: Option<f32>, t| Some(acc.map_or(t, |a| a.max(t))))
    }
}

impl TemperatureSensor for HostSensor {
    fn read_raw_temperature(&mut self) -> RawTemperature {
        self.components.refresh(true);
        match self.hottest_celsius() {
            Some(celsius) => {
                self.last = celsius_to_raw(celsius);
                self.warned = false;
            }
            None if !self.warned => {
                warn!("Sem leitura térmica, repetindo a última ({})", self.last);
                self.warned = true;
            }
            None => {}
        }
        self.last
    }
}

/// °C em ponto flutuante → quartos de grau.
fn celsius_to_raw(celsius: f32) -> RawTemperature {
    (celsius * 4.0)
        .round()
        .clamp(RawTemperature::MIN as f32, RawTemperature::MAX as f32) as RawTemperature
}
