//! Alarme de temperatura – threshold fixo e comando do indicador.

use crate::types::RawTemperature;

/// Temperatura que dispara o alarme, em unidades brutas (35 °C × 4).
pub const ALARM_LIMIT_RAW: RawTemperature = 35 * 4;

/// Alarme ativo quando a leitura passa estritamente do limite.
pub const fn alarm_for_raw(raw: RawTemperature) -> bool {
    raw > ALARM_LIMIT_RAW
}

/// Comando enviado ao LED de alarme em cada tick do indicador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCommand {
    Off,
    Toggle,
}

/// Pisca enquanto o alarme estiver ativo, apaga caso contrário.
pub const fn indicator_command(alarm: bool) -> IndicatorCommand {
    if alarm {
        IndicatorCommand::Toggle
    } else {
        IndicatorCommand::Off
    }
}
