//! Latch appliance daemon.
//!
//! Wires the control loop to the remote link, the local datagram
//! channel, and the peripheral set, then runs until an unrecoverable
//! fault. The process exits non-zero on a fatal error and relies on its
//! supervisor (systemd or similar) to restart it, which is the recovery
//! path for a wedged reader or a dead link.
//!
//! Hardware note: this build drives the mock peripheral set, which is
//! the development harness. Real drivers implement the same traits in
//! `latchkey-hardware` and slot in here.

mod config;

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use latchkey_controller::{AccessPolicy, Controller, ControllerConfig};
use latchkey_hardware::mock::{MockButton, MockDistanceSensor, MockNfcDriver, MockServo};
use latchkey_network::{LinkConfig, RemoteLink, UdpCommandListener};

use config::Config;

/// Command channel depth shared by all inbound paths.
const COMMAND_QUEUE_CAPACITY: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path_arg = std::env::args().nth(1);
    let config = Config::resolve(path_arg.as_deref())?;
    info!(?config, "configuration loaded");

    let policy = AccessPolicy::from_ids(&config.allowed_cards)
        .context("invalid card id in allowed_cards")?;
    if policy.is_empty() {
        info!("allow-list is empty, every card will be rejected");
    }

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);

    let link = RemoteLink::spawn(LinkConfig::new(config.server_addr), command_tx.clone());

    let udp_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.udp_port));
    let udp = UdpCommandListener::bind(udp_addr)
        .await
        .with_context(|| format!("binding UDP command listener on {udp_addr}"))?;
    let _udp_task = udp.spawn(command_tx.clone());

    spawn_stdin_commands(command_tx);

    let (distance, distance_handle) = MockDistanceSensor::new();
    let (nfc, nfc_handle) = MockNfcDriver::new();
    let (servo, _servo_handle) = MockServo::new();
    let (button, _button_handle) = MockButton::new();
    // Quiet defaults: door far away, reader online, no card in field.
    distance_handle.set_millimeters(500);
    nfc_handle.set_online(true);

    let mut controller = Controller::new(
        distance,
        nfc,
        servo,
        button,
        link.publisher(),
        policy,
        command_rx,
        link.status().failure_counter(),
        ControllerConfig {
            nfc_init_retries: config.nfc_init_retries,
        },
    );

    spawn_display(controller.snapshots());

    match controller.run().await {
        Ok(()) => Ok(()),
        Err(fatal) => {
            error!(%fatal, "unrecoverable fault, exiting for supervisor restart");
            std::process::exit(1);
        }
    }
}

/// Development convenience: lines typed on stdin feed the same command
/// dispatcher as the remote channels.
fn spawn_stdin_commands(command_tx: mpsc::Sender<String>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            if command_tx.send(command.to_string()).await.is_err() {
                return;
            }
        }
    });
}

/// Log each snapshot change; stands in for the appliance's local panel.
fn spawn_display(mut snapshots: tokio::sync::watch::Receiver<latchkey_controller::DisplaySnapshot>) {
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            info!(target: "latchkeyd::display", "{snapshot}");
        }
    });
}
