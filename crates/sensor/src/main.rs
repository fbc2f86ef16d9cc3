//! # WSN Sensor
//!
//! Nó sensor: registra-se no coletor e envia a temperatura periodicamente
//! via UDP enquanto estiver registrado.
//!
//! ## Uso
//! ```bash
//! wsn_sensor              # config.toml ao lado do executável
//! RUST_LOG=debug wsn_sensor
//! ```
//! Enter no terminal alterna a unidade entre °C e °F.

mod button;
mod event_loop;
mod indicator;
mod net;
mod routing;
mod sensors;

use crossbeam_channel::bounded;
use indicator::LogLed;
use net::UdpTransport;
use routing::StaticRoute;
use sensors::NodeSensor;
use std::net::UdpSocket;
use std::time::Instant;
use tracing::{error, info, warn};
use wsn_core::config::{AppConfig, bind_addr};
use wsn_core::node::{Event, SensorNode};
use wsn_core::timer::{Scheduler, Tick};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }
    for problem in config.validate() {
        warn!("Config: {problem}");
    }

    let cfg = &config.sensor;
    let collector = cfg.collector_socket_addr();
    if collector.is_none() {
        error!("Endereço do coletor inválido, o nó nunca verá o root");
    }

    // ── Socket UDP ──
    let local = bind_addr(&cfg.bind_ip, cfg.port);
    let sock = match UdpSocket::bind(&local) {
        Ok(sock) => sock,
        Err(e) => {
            error!("Falha ao bind {local}: {e}");
            std::process::exit(1);
        }
    };
    let rx_sock = match sock.try_clone() {
        Ok(s) => s,
        Err(e) => {
            error!("Falha ao clonar socket: {e}");
            std::process::exit(1);
        }
    };

    // ── Fontes de eventos ──
    let (tx, rx) = bounded::<Event>(64);
    if let Err(e) = net::spawn_receiver_thread(rx_sock, tx.clone()) {
        error!("Falha ao criar thread de rede: {e}");
        std::process::exit(1);
    }
    if let Err(e) = button::spawn_button_thread(tx) {
        warn!("Botão indisponível: {e}");
    }

    // ── Nó ──
    let mut node = SensorNode::new(
        cfg.node_id,
        cfg.unit,
        StaticRoute::new(collector),
        NodeSensor::from_config(cfg),
        LogLed::default(),
        UdpTransport::new(sock),
    );
    let mut scheduler = Scheduler::new(
        &[
            (Tick::Registration, cfg.register_interval()),
            (Tick::Measure, cfg.measure_interval()),
            (Tick::Send, cfg.send_interval()),
            (Tick::Indicator, cfg.indicator_interval()),
        ],
        Instant::now(),
    );
    info!("Nó 0x{:02X} inicializado", cfg.node_id);

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   📡 WSN SENSOR – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Nó:        0x{:02X} ({})", cfg.node_id, cfg.node_id);
    println!("  Local:     {local}");
    println!("  Coletor:   {}", cfg.collector_addr);
    println!("  Unidade:   {}", cfg.unit);
    println!(
        "  Ticks:     reg {:.1}s | medida {:.1}s | envio {:.1}s | LED {}ms",
        cfg.register_interval_secs,
        cfg.measure_interval_secs,
        cfg.send_interval_secs,
        cfg.indicator_interval_ms
    );
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    event_loop::run(&mut node, &mut scheduler, &rx);
}
