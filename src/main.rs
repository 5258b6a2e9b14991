//! Interactive kiosk console against the simulated hardware.
//!
//! Session commands: `start`, `scan`, `stop`, `reset`, `state`.
//! Simulator knobs: `weight <g>`, `metal on|off`, `bin <cm>`.
//!
//! Point `KIOSK_API_BASE` (and `KIOSK_API_SECRET`) at a session server to
//! exercise the HTTP client; without it, every session runs offline.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};

use revend::adapters::cloud::{HttpSessionApi, NullSessionApi};
use revend::adapters::log_sink::LogEventSink;
use revend::adapters::sim::{SimCamera, SimHardware, SimModel};
use revend::app::commands::KioskCommand;
use revend::app::ports::{SessionApi, StartReceipt};
use revend::app::service::KioskService;
use revend::config::KioskConfig;
use revend::error::CloudError;
use revend::vision::classifier::Classifier;
use revend::vision::source::FrameSource;

enum CloudBackend {
    Http(HttpSessionApi),
    Null(NullSessionApi),
}

impl SessionApi for CloudBackend {
    fn notify_start(&mut self, bin_id: &str) -> Result<StartReceipt, CloudError> {
        match self {
            Self::Http(api) => api.notify_start(bin_id),
            Self::Null(api) => api.notify_start(bin_id),
        }
    }

    fn notify_stop(
        &mut self,
        transaction_id: &str,
        plastic: u32,
        cans: u32,
    ) -> Result<(), CloudError> {
        match self {
            Self::Http(api) => api.notify_stop(transaction_id, plastic, cans),
            Self::Null(api) => api.notify_stop(transaction_id, plastic, cans),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("REVEND_CONFIG").ok())
        .map_or_else(|| PathBuf::from("revend.json"), PathBuf::from);
    let config = KioskConfig::load_or_default(&config_path);

    let mut cloud = match env::var("KIOSK_API_BASE") {
        Ok(base) => {
            let secret = env::var("KIOSK_API_SECRET").unwrap_or_default();
            info!("Using session API at {base}");
            CloudBackend::Http(
                HttpSessionApi::new(&base, secret)
                    .map_err(revend::Error::from)
                    .context("building HTTP session client")?,
            )
        }
        Err(_) => {
            info!("No KIOSK_API_BASE set, sessions run offline");
            CloudBackend::Null(NullSessionApi)
        }
    };

    let frames = FrameSource::new(SimCamera::new(), &config);
    let classifier = Classifier::new(SimModel::new(), config.label_map, config.pixel_norm);
    let mut service = KioskService::new(config, frames, classifier);

    let mut hw = SimHardware::new();
    let mut sink = LogEventSink;

    println!("revend console. Commands: start scan stop reset state | weight <g> | metal on|off | bin <cm>");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        if let Some(command) = KioskCommand::parse(&line) {
            match command {
                KioskCommand::Start => match service.start(&mut hw, &mut cloud, &mut sink) {
                    Ok(()) => {
                        if !service.await_first_frame(Duration::from_secs(2)) {
                            warn!("Camera running but no frame yet");
                        }
                        println!("session running");
                    }
                    Err(reason) => println!("start refused: {reason}"),
                },
                KioskCommand::Scan => match service.scan(&mut hw, &mut sink) {
                    Ok(outcome) => {
                        println!("{} ({:.1}g)", outcome.label, outcome.item_weight_g);
                    }
                    Err(reason) => println!("scan failed: {reason}"),
                },
                KioskCommand::Stop => {
                    service.stop(&mut cloud, &mut sink);
                    println!("session stopped");
                }
                KioskCommand::Reset => {
                    service.reset(&mut sink);
                    println!("idle");
                }
                KioskCommand::ShowState => {
                    let snapshot = service.state_snapshot(&mut hw);
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
            }
            continue;
        }

        if !apply_sim_knob(&mut hw, &line) {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                println!("unknown command: {trimmed}");
            }
        }
    }

    Ok(())
}

/// Simulator tuning commands; returns false when the line is not one.
fn apply_sim_knob(hw: &mut SimHardware, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("weight"), Some(value)) => match value.parse::<f32>() {
            Ok(grams) => {
                hw.weight_g = grams;
                println!("platform weight set to {grams}g");
                true
            }
            Err(_) => false,
        },
        (Some("metal"), Some(state)) => match state {
            "on" => {
                hw.metal = true;
                println!("metal sensor on");
                true
            }
            "off" => {
                hw.metal = false;
                println!("metal sensor off");
                true
            }
            _ => false,
        },
        (Some("bin"), Some(value)) => match value.parse::<f32>() {
            Ok(cm) => {
                hw.echo_distance_cm = Some(cm);
                println!("bin sensor distance set to {cm}cm");
                true
            }
            Err(_) => false,
        },
        _ => false,
    }
}
