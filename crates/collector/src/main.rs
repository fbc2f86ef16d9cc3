//! # WSN Collector
//!
//! Root da rede: aceita registros dos nós sensores e imprime cada frame INFO
//! como `ID;Unidade;Temp;ID_alarme;Estado` no stdout. Logs vão pelo
//! `tracing`.

mod net_thread;
mod root;
mod server;

use root::HostRoot;
use server::Collector;
use std::net::UdpSocket;
use std::time::Instant;
use tracing::{error, warn};
use wsn_core::config::{AppConfig, bind_addr};
use wsn_core::timer::PeriodicTimer;
use wsn_core::traits::RootRouting;

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }
    for problem in config.validate() {
        warn!("Config: {problem}");
    }
    let cfg = &config.collector;

    // ── Socket UDP ──
    let local = bind_addr(&cfg.bind_ip, cfg.port);
    let sock = match UdpSocket::bind(&local) {
        Ok(sock) => sock,
        Err(e) => {
            error!("Falha ao bind {local}: {e}");
            std::process::exit(1);
        }
    };

    let mut root = HostRoot::new(&sock);
    root.become_root();

    let rx = match sock
        .try_clone()
        .and_then(net_thread::spawn_receiver_thread)
    {
        Ok(rx) => rx,
        Err(e) => {
            error!("Falha ao criar thread de rede: {e}");
            std::process::exit(1);
        }
    };

    // ── Banner ──
    eprintln!();
    eprintln!("══════════════════════════════════════════════");
    eprintln!("   🛰  WSN COLLECTOR – ROOT ATIVO");
    eprintln!("══════════════════════════════════════════════");
    eprintln!("  Escutando: {local}");
    eprintln!("  Anúncio:   {:.1}s", cfg.announce_interval_secs);
    eprintln!("  Médias:    {}", if cfg.stats_enabled { "sim" } else { "não" });
    eprintln!("══════════════════════════════════════════════");
    eprintln!();

    // ── Loop principal ──
    let mut collector = Collector::new(cfg.stats_enabled);
    let announce = PeriodicTimer::set_periodic(cfg.announce_interval(), Instant::now());
    server::run(&mut collector, &root, &sock, &rx, announce);
}
