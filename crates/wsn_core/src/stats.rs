//! Estatísticas por nó no coletor.
//!
//! Cada report é normalizado para °C e °F e entra numa média acumulada
//! desde o início do processo.

use crate::collector::TelemetryReport;
use crate::types::{NodeId, Unit};
use std::collections::BTreeMap;

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Acumulado de um nó.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStats {
    pub samples: u64,
    pub last_celsius: f64,
    pub last_fahrenheit: f64,
    total_celsius: f64,
    total_fahrenheit: f64,
    pub last_alarm: bool,
}

impl NodeStats {
    pub fn avg_celsius(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_celsius / self.samples as f64
        }
    }

    pub fn avg_fahrenheit(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_fahrenheit / self.samples as f64
        }
    }

    fn record(&mut self, report: &TelemetryReport) {
        let value = report.value();
        let (c, f) = match report.unit {
            Unit::Celsius => (value, celsius_to_fahrenheit(value)),
            Unit::Fahrenheit => (fahrenheit_to_celsius(value), value),
        };
        self.samples += 1;
        self.last_celsius = c;
        self.last_fahrenheit = f;
        self.total_celsius += c;
        self.total_fahrenheit += f;
        self.last_alarm = report.alarm_state;
    }
}

/// Estatísticas de todos os nós vistos.
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    nodes: BTreeMap<NodeId, NodeStats>,
}

impl TelemetryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um report e devolve o acumulado atualizado do nó.
    pub fn record(&mut self, report: &TelemetryReport) -> &NodeStats {
        let entry = self.nodes.entry(report.node_id).or_default();
        entry.record(report);
        entry
    }

    pub fn get(&self, node_id: NodeId) -> Option<&NodeStats> {
        self.nodes.get(&node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeStats)> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(node_id: NodeId, unit: Unit, integer: u32, hundredths: u32) -> TelemetryReport {
        TelemetryReport {
            node_id,
            unit,
            integer,
            hundredths,
            alarm_kind: 1,
            alarm_state: false,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn conversions() {
        assert!(close(celsius_to_fahrenheit(35.0), 95.0));
        assert!(close(fahrenheit_to_celsius(95.0), 35.0));
    }

    #[test]
    fn mixed_units_are_normalized() {
        let mut stats = TelemetryStats::new();
        stats.record(&report(0xAA, Unit::Celsius, 20, 0));
        let node = stats.record(&report(0xAA, Unit::Fahrenheit, 86, 0)).clone();

        assert_eq!(node.samples, 2);
        assert!(close(node.last_celsius, 30.0));
        assert!(close(node.avg_celsius(), 25.0));
        assert!(close(node.avg_fahrenheit(), 77.0));
    }

    #[test]
    fn nodes_are_tracked_separately() {
        let mut stats = TelemetryStats::new();
        stats.record(&report(1, Unit::Celsius, 10, 0));
        stats.record(&report(2, Unit::Celsius, 30, 50));
        assert_eq!(stats.node_count(), 2);
        assert!(close(stats.get(2).map(|n| n.avg_celsius()).unwrap(), 30.5));
        assert!(stats.get(3).is_none());
    }

    #[test]
    fn empty_stats_average_is_zero() {
        assert_eq!(NodeStats::default().avg_celsius(), 0.0);
    }
}
