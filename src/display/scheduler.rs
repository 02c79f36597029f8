/*
 *  display/scheduler.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  The dedicated update loop: bounded sleeps, early wakes, snapshot
 *  outside-the-lock rendering, and flush failure escalation
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

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::assets::AssetStore;
use crate::display::engine::{Engine, FrameRenderer, FLUSH_FAILURE_LIMIT};
use crate::display::traits::DisplayDriver;

/// Cadence a brightness fade requests while it is converging; min-merged
/// against the base refresh so the fade steps smoothly
const FADE_TICK: Duration = Duration::from_millis(25);

/// Spawn the update scheduler for an engine.
///
/// The task owns the driver, the asset store and the render surface. It
/// loops until the stop signal flips true: sleep until the next scheduled
/// wake (or earlier, when a caller requests an update), snapshot the shared
/// state under the lock, render and flush with the lock released.
pub fn spawn(
    engine: &Engine,
    mut driver: Box<dyn DisplayDriver>,
    store: Box<dyn AssetStore>,
    stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let cfg = engine.config().clone();
    let shared = engine.shared();
    let wake = engine.wake();
    let mut renderer = FrameRenderer::new(cfg.clone());
    let mut stop = stop;

    {
        let mut st = shared.lock().unwrap();
        st.running = true;
        st.next_wake = Instant::now();
    }

    tokio::spawn(async move {
        log::info!(
            "update scheduler started, {}x{} @ {:?} cadence",
            cfg.width, cfg.height, cfg.refresh
        );

        loop {
            let deadline = {
                let st = shared.lock().unwrap();
                st.next_wake
            };

            tokio::select! {
                _ = wake.notified() => {}
                _ = tokio::time::sleep_until(deadline.into()) => {}
                changed = stop.changed() => {
                    // a closed stop channel also means shut down
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
            if *stop.borrow() {
                // exit without completing a partial flush
                break;
            }

            let now = Instant::now();
            let snapshot = {
                let mut st = shared.lock().unwrap();
                // base cadence; any schedule_wake_in() call can pull it in
                st.next_wake = now + cfg.refresh;
                let snap = crate::display::engine::Engine::snapshot(&mut st, &cfg, now);
                // a fade in flight asks for a faster tick than the base cadence
                if snap.as_ref().is_some_and(|s| s.brightness.is_some()) {
                    st.merge_wake(now + FADE_TICK);
                }
                snap
            };

            // rendering happens with the lock released; external callers
            // never wait on drawing time
            let Some(snapshot) = snapshot else {
                continue; // inactive until reactivate()
            };

            if let Some(level) = snapshot.brightness {
                if driver.capabilities().supports_brightness {
                    if let Err(e) = driver.set_brightness(level) {
                        log::warn!("brightness update failed: {}", e);
                    }
                }
            }

            let Some(region) = renderer.render(&snapshot, store.as_ref(), now) else {
                continue; // nothing visible changed
            };

            match driver.flush(&renderer.surface().view(), region) {
                Ok(()) => {
                    renderer.commit();
                    let mut st = shared.lock().unwrap();
                    st.flush_failures = 0;
                }
                Err(e) => {
                    let mut st = shared.lock().unwrap();
                    st.flush_failures += 1;
                    if st.flush_failures >= FLUSH_FAILURE_LIMIT {
                        st.active = false;
                        log::error!(
                            "flush failed {} times, engine inactive until reactivated: {}",
                            st.flush_failures, e
                        );
                    } else {
                        log::warn!("flush failed, skipping frame: {}", e);
                    }
                }
            }
        }

        let mut st = shared.lock().unwrap();
        st.running = false;
        log::info!("update scheduler stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use crate::brightness::BrightnessConfig;
    use crate::display::drivers::mock::MockDriver;
    use crate::display::engine::EngineConfig;

    fn test_engine() -> Engine {
        let cfg = EngineConfig {
            refresh: Duration::from_millis(5),
            ..EngineConfig::default()
        };
        Engine::new(cfg)
    }

    #[tokio::test]
    async fn renders_and_stops_cleanly() {
        let engine = test_engine();
        let handle = engine.handle();
        let driver = MockDriver::new(128, 64);
        let state = driver.state();
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

        handle.set_channel(1, "Test");
        handle.request_update();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(state.lock().unwrap().flush_count > 0);

        stop_tx.send(true).unwrap();
        task.await.unwrap();
        assert!(!engine.shared().lock().unwrap().running);
    }

    #[tokio::test]
    async fn fade_outpaces_the_base_cadence() {
        let cfg = EngineConfig {
            refresh: Duration::from_millis(500),
            brightness: BrightnessConfig {
                bright: 255,
                dim: 40,
                dim_after: Duration::from_millis(0),
                fade_step: 16,
            },
            ..EngineConfig::default()
        };
        let engine = Engine::new(cfg);
        let handle = engine.handle();
        let driver = MockDriver::new(128, 64);
        let state = driver.state();
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

        handle.request_update();
        // 255 down to 40 at step 16 is 14 fade ticks; riding the base
        // cadence alone that would take seven seconds
        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(state.lock().unwrap().last_brightness, Some(40));

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn three_flush_failures_deactivate_then_reactivate() {
        let engine = test_engine();
        let handle = engine.handle();
        let driver = MockDriver::new(128, 64);
        let state = driver.state();
        state.lock().unwrap().simulate_flush_failure = true;
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

        // keep the frame dirty so every wake attempts a flush
        for _ in 0..6 {
            handle.set_volume(50, true);
            handle.request_update();
            tokio::time::sleep(Duration::from_millis(15)).await;
        }
        assert!(!handle.is_active());
        let failed_flushes = state.lock().unwrap().flush_count;

        // recovery: clear the fault and explicitly reactivate
        state.lock().unwrap().simulate_flush_failure = false;
        handle.reactivate();
        handle.request_update();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_active());
        assert!(state.lock().unwrap().flush_count > failed_flushes);

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
