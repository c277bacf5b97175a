pub mod camera;
pub mod config;
pub mod control;
pub mod controller;
pub mod display;
pub mod visca;

use crate::camera::NetworkTransport;
use crate::config::{AppConfig, CAMERAS_ENV};
use crate::control::{ControlLoop, Controller};
use crate::controller::GilrsInput;
use crate::display::open_display;
use color_eyre::{eyre::eyre, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = AppConfig::default_path();
    let config = AppConfig::load(config_path.as_deref());

    let mut display = open_display(&config.display);
    display.boot("Parsing cameras…");

    let cameras_env = std::env::var(CAMERAS_ENV).ok();
    let cameras = config.camera_setup(cameras_env.as_deref());
    for e in &cameras.errors {
        warn!("Invalid camera entry: {}", e);
        display.error(cameras.status_message(e));
    }
    if cameras.used_fallback {
        display.error(cameras.fallback_message());
    }
    let listed: Vec<String> = cameras.targets.iter().map(ToString::to_string).collect();
    info!("PTZ bridge cameras: {}", listed.join(", "));

    let cancel = CancellationToken::new();
    spawn_signal_handlers(cancel.clone());

    display.boot("Starting gamepad…");
    let input = match GilrsInput::new() {
        Ok(input) => input,
        Err(e) => {
            display.error("Gamepad init failed");
            return Err(eyre!("Failed to start gamepad input: {}", e));
        }
    };
    display.boot("Waiting for joystick…");

    let controller = Controller::new(config.control, config.layout, cameras.targets.len());
    let transport = NetworkTransport::new(config.network.send_timeout());

    ControlLoop::create(
        controller,
        cameras.targets,
        Box::new(input),
        Box::new(transport),
        display,
        cancel,
    )
    .run()
    .await;

    info!("PTZ bridge shut down");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

/// Cancels `token` on Ctrl-C or SIGTERM
fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                ctrl_c.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
                token.cancel();
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    });
}
