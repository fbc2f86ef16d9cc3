//! Conversões entre leitura bruta (quartos de grau) e Q12.4.
//!
//! Aritmética inteira apenas: o resultado precisa ser idêntico bit a bit ao
//! do firmware dos nós. A conversão de volta é só para exibição.

use crate::types::{Q12_4, RawTemperature, Unit};

/// Fator de escala Q12.4 (4 bits fracionários).
pub const Q12_4_SCALE: i32 = 16;

/// Offset de 32 °F já escalado por 16.
const FAHRENHEIT_OFFSET_Q12_4: i32 = 32 * Q12_4_SCALE;

/// Graus inteiros a partir da leitura bruta, truncando em direção a zero.
pub const fn raw_to_whole_celsius(raw: RawTemperature) -> i32 {
    raw as i32 / 4
}

/// Satura os bits brutos (graus × 16) na faixa de [`Q12_4`].
const fn saturate(bits: i32) -> Q12_4 {
    if bits < 0 {
        Q12_4::ZERO
    } else if bits > u16::MAX as i32 {
        Q12_4::MAX
    } else {
        Q12_4::from_bits(bits as u16)
    }
}

/// Leitura bruta → Celsius Q12.4.
pub const fn celsius_to_q12_4(raw: RawTemperature) -> Q12_4 {
    saturate(raw_to_whole_celsius(raw) * Q12_4_SCALE)
}

/// Leitura bruta → Fahrenheit Q12.4.
///
/// `F = round(C * 144 / 5) + 512`, com arredondamento "half away from zero"
/// feito somando/subtraindo 2 antes de dividir por 5.
pub const fn fahrenheit_to_q12_4(raw: RawTemperature) -> Q12_4 {
    let mut num = raw_to_whole_celsius(raw) * 144;
    if num >= 0 {
        num += 2;
    } else {
        num -= 2;
    }
    saturate(num / 5 + FAHRENHEIT_OFFSET_Q12_4)
}

/// Decompõe Q12.4 em parte inteira e centésimos (arredondado).
pub const fn decode_q12_4_to_decimal(value: Q12_4) -> (u32, u32) {
    let centi = (value.to_bits() as u32 * 100 + 8) / 16;
    (centi / 100, centi % 100)
}

impl Unit {
    /// Codifica a leitura bruta na unidade selecionada.
    pub const fn encode(self, raw: RawTemperature) -> Q12_4 {
        match self {
            Unit::Celsius => celsius_to_q12_4(raw),
            Unit::Fahrenheit => fahrenheit_to_q12_4(raw),
        }
    }
}
