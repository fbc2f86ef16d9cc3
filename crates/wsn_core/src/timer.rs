//! Timers periódicos e escolha do próximo tick.
//!
//! Todo tempo é passado explicitamente (`now`) para que o laço de eventos
//! possa ser testado sem relógio real.

use std::time::{Duration, Instant};

/// Menor período aceito; um período zero faria o laço girar sem dormir.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Timer periódico no estilo "expira, reseta".
///
/// `reset()` avança o deadline em exatamente um período a partir do deadline
/// anterior, mantendo a cadência. Se o laço atrasou mais que um período, o
/// deadline é realinhado para evitar rajadas de ticks.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    deadline: Instant,
}

impl PeriodicTimer {
    /// Arma um timer que expira pela primeira vez em `now + period`.
    ///
    /// Períodos menores que [`MIN_PERIOD`] são elevados a ele.
    pub fn set_periodic(period: Duration, now: Instant) -> Self {
        let period = period.max(MIN_PERIOD);
        Self {
            period,
            deadline: now + period,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Rearma o timer para o próximo período.
    pub fn reset(&mut self, now: Instant) {
        self.deadline += self.period;
        if self.deadline <= now {
            self.deadline = now + self.period;
        }
    }
}

/// Ticks periódicos do nó sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    /// Verificação de registro.
    Registration,
    /// Leitura do sensor + cálculo do alarme.
    Measure,
    /// Envio do frame INFO.
    Send,
    /// LED de alarme.
    Indicator,
}

/// Conjunto fixo de timers, um por tick.
#[derive(Debug, Clone)]
pub struct Scheduler {
    timers: Vec<(Tick, PeriodicTimer)>,
}

impl Scheduler {
    pub fn new(periods: &[(Tick, Duration)], now: Instant) -> Self {
        Self {
            timers: periods
                .iter()
                .map(|&(tick, period)| (tick, PeriodicTimer::set_periodic(period, now)))
                .collect(),
        }
    }

    /// Próximo instante em que algum timer expira.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|(_, t)| t.deadline()).min()
    }

    /// Retorna os ticks vencidos em `now`, já rearmando cada timer.
    ///
    /// Cada tick aparece no máximo uma vez por chamada.
    pub fn poll(&mut self, now: Instant) -> Vec<Tick> {
        let mut due = Vec::new();
        for (tick, timer) in &mut self.timers {
            if timer.expired(now) {
                timer.reset(now);
                due.push(*tick);
            }
        }
        due
    }
}
