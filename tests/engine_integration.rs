/*
 *  tests/engine_integration.rs
 *
 *  Integration tests for the render engine
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 */

use std::time::Duration;

use tokio::sync::watch;

use lumipane::assets::MemoryAssetStore;
use lumipane::display::drivers::mock::MockDriver;
use lumipane::display::{scheduler, Engine, EngineConfig};
use lumipane::span::{BarHeightsRequest, SpanRequest, SpanResponse, SPAN_CLIENT_CHECK, SPAN_GET_BAR_HEIGHTS};
use lumipane::SpanError;

fn fast_engine() -> Engine {
    Engine::new(EngineConfig {
        refresh: Duration::from_millis(5),
        ..EngineConfig::default()
    })
}

#[tokio::test]
async fn frames_reach_the_driver() {
    let engine = fast_engine();
    let handle = engine.handle();
    let driver = MockDriver::new(128, 64);
    let state = driver.state();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = scheduler::spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

    handle.set_channel(2, "ZDF");
    handle.set_programme("20:15", "Evening News");
    tokio::time::sleep(Duration::from_millis(60)).await;

    {
        let st = state.lock().unwrap();
        assert!(st.flush_count > 0, "scheduler never flushed");
        assert!(!st.last_frame.is_empty());
        assert!(st.last_frame.iter().any(|&b| b != 0), "frame is blank");
    }

    stop_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn state_transition_flushes_full_screen() {
    let engine = fast_engine();
    let handle = engine.handle();
    let driver = MockDriver::new(128, 64);
    let state = driver.state();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = scheduler::spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

    // settle in Normal first
    handle.set_channel(1, "ARD");
    tokio::time::sleep(Duration::from_millis(40)).await;

    handle.set_menu_title("Main Menu");
    handle.set_menu_item("Schedule");
    handle.set_menu_item("Recordings");
    handle.set_menu_current_item("Recordings");
    tokio::time::sleep(Duration::from_millis(40)).await;

    {
        let st = state.lock().unwrap();
        // the Normal -> Menu transition produced at least one full-screen region
        assert!(
            st.regions.iter().any(|r| r.size.width == 128 && r.size.height == 64),
            "no full-screen flush after state transition: {:?}",
            st.regions
        );
    }

    stop_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn span_calls_do_not_block_on_rendering() {
    let engine = fast_engine();
    let handle = engine.handle();
    let driver = MockDriver::new(128, 64);
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = scheduler::spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

    handle.push_audio_frame(&[180; 32], &[120; 32], 70, 50);

    // concurrent callers with distinct names keep independent registrations
    let mut joins = Vec::new();
    for (name, bands) in [("musicplayer", 20usize), ("netradio", 10)] {
        let h = handle.clone();
        joins.push(tokio::spawn(async move {
            for _ in 0..50 {
                let req = BarHeightsRequest {
                    caller: name.to_string(),
                    bands,
                    falloff: 2,
                };
                match h.service(SPAN_GET_BAR_HEIGHTS, SpanRequest::GetBarHeights(req)) {
                    Ok(SpanResponse::BarHeights(b)) => {
                        assert_eq!(b.bar_heights.len(), bands);
                        assert_eq!(b.volume_both, 60);
                    }
                    other => panic!("unexpected: {:?}", other),
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }));
    }
    for j in joins {
        j.await.unwrap();
    }

    match handle.service(SPAN_CLIENT_CHECK, SpanRequest::ClientCheck).unwrap() {
        SpanResponse::ClientCheck(c) => {
            assert!(c.is_active);
            assert!(c.is_running);
        }
        other => panic!("unexpected: {:?}", other),
    }

    stop_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn unknown_capability_is_not_fatal() {
    let engine = fast_engine();
    let handle = engine.handle();

    let err = handle
        .service("give-me-pixels-v9", SpanRequest::ClientCheck)
        .unwrap_err();
    assert!(matches!(err, SpanError::Unsupported(_)));

    // the engine is unaffected and still serves known tokens
    assert!(handle.service(SPAN_CLIENT_CHECK, SpanRequest::ClientCheck).is_ok());
}

#[tokio::test]
async fn flush_failures_deactivate_until_reactivated() {
    let engine = fast_engine();
    let handle = engine.handle();
    let driver = MockDriver::new(128, 64);
    let state = driver.state();
    state.lock().unwrap().simulate_flush_failure = true;
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = scheduler::spawn(&engine, Box::new(driver), Box::new(MemoryAssetStore::new()), stop_rx);

    handle.set_channel(1, "ARD");
    for _ in 0..8 {
        handle.request_update();
        tokio::time::sleep(Duration::from_millis(15)).await;
    }
    assert!(!handle.is_active(), "engine should be inactive after repeated flush failures");

    // no self-healing: clearing the fault alone is not enough
    state.lock().unwrap().simulate_flush_failure = false;
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(!handle.is_active());

    let before = state.lock().unwrap().flush_count;
    handle.reactivate();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(handle.is_active());
    assert!(state.lock().unwrap().flush_count > before, "no flush after reactivation");

    stop_tx.send(true).unwrap();
    task.await.unwrap();
}
