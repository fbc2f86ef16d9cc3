//! LED de alarme sem hardware: registra as transições no log.

use tracing::debug;
use wsn_core::traits::Indicator;

#[derive(Debug, Default)]
pub struct LogLed {
    lit: bool,
}

impl LogLed {
    fn set(&mut self, lit: bool) {
        if lit != self.lit {
            debug!("LED vermelho {}", if lit { "●" } else { "○" });
        }
        self.lit = lit;
    }
}

impl Indicator for LogLed {
    fn on(&mut self) {
        self.set(true);
    }

    fn off(&mut self) {
        self.set(false);
    }

    fn toggle(&mut self) {
        self.set(!self.lit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_and_off() {
        let mut led = LogLed::default();
        led.toggle();
        assert!(led.lit);
        led.toggle();
        assert!(!led.lit);
        led.on();
        led.off();
        assert!(!led.lit);
    }
}
