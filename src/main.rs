/*
 *  main.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Daemon entry point: config, logging, driver wiring, signals
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::Result;
use env_logger::Env;
use log::{error, info};
use tokio::sync::watch;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use lumipane::assets::MemoryAssetStore;
use lumipane::display::drivers::console::ConsoleDriver;
use lumipane::display::{scheduler, Engine};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Wait for SIGINT, SIGTERM or SIGHUP and return once one arrives.
#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received"),
        _ = sigterm.recv() => info!("SIGTERM received"),
        _ = sighup.recv() => info!("SIGHUP received"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("ctrl-c received");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let (cfg, cli) = lumipane::config::load()?;

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if cli.dump_config {
        println!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    info!(
        "LumiPane {} ({}) starting",
        env!("CARGO_PKG_VERSION"),
        BUILD_DATE
    );

    let engine_cfg = cfg.engine_config();
    let (width, height) = (engine_cfg.width, engine_cfg.height);
    let engine = Engine::new(engine_cfg);
    let handle = engine.handle();

    let driver = Box::new(ConsoleDriver::new(width, height));
    let store = Box::new(MemoryAssetStore::new());
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = scheduler::spawn(&engine, driver, store, stop_rx);

    handle.request_update();

    wait_for_signal().await?;
    info!("shutting down");
    if stop_tx.send(true).is_err() {
        error!("scheduler already gone");
    }
    task.await?;
    Ok(())
}
