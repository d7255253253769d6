//! gestured - fist gesture detection and broadcast daemon
//!
//! 1. Loads configuration (file + env)
//! 2. Starts the configured hand landmark estimator backend
//! 3. Serves the WebSocket wire protocol: inbound video frames run the
//!    detect→stabilize pipeline and the result is broadcast to every
//!    connected client
//!
//! Lifecycle is managed by an external orchestrator; the daemon exits
//! nonzero on fatal startup errors (e.g. bind failure) and stops
//! cleanly on SIGINT.

use anyhow::Result;
use std::sync::mpsc;

use gesture_server::gesture::Stabilizer;
use gesture_server::{select_estimator, DetectionPipeline, GestureServer, GesturedConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = GesturedConfig::load()?;

    let mut estimator = select_estimator(&cfg.estimator)?;
    estimator.warm_up()?;
    log::info!("estimator backend: {}", estimator.name());

    let stabilizer = Stabilizer::new(
        cfg.stabilizer.required_fist_frames,
        cfg.stabilizer.required_no_fist_frames,
    );
    let pipeline = DetectionPipeline::new(
        estimator,
        stabilizer,
        cfg.inference.width,
        cfg.inference.height,
    );

    let handle = GestureServer::new(cfg.listen_addr.clone(), pipeline).spawn()?;
    log::info!("gestured listening on ws://{}", handle.addr);
    log::info!(
        "stability: {} fist frames to latch, {} to release",
        cfg.stabilizer.required_fist_frames,
        cfg.stabilizer.required_no_fist_frames
    );

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let _ = stop_rx.recv();
    log::info!("shutting down");
    handle.stop()?;
    Ok(())
}
