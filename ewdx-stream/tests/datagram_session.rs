//! Datagram session scenarios against an in-memory device.

mod mock_links;

use std::sync::Arc;

use ewdx_state::decoders::ReceiverDecoder;
use ewdx_state::{DeviceModel, DeviceState, DeviceStore, StateChange};
use ewdx_stream::datagram::NOT_RESPONDING;
use ewdx_stream::{ConnectionStatus, DatagramProfile, DatagramSession, DatagramTiming, StatusPublisher};
use mock_links::{settle, settle_for, MockDevice};
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_test::assert_ok;

struct Harness {
    device: Arc<MockDevice>,
    store: Arc<DeviceStore>,
    status: StatusPublisher,
    session: DatagramSession,
}

fn start(model: DeviceModel) -> Harness {
    let device = MockDevice::new();
    let store = Arc::new(DeviceStore::new(model));
    let status = StatusPublisher::new();
    let session = DatagramSession::start(
        device.clone(),
        Arc::clone(&store),
        DatagramProfile::for_model(model).unwrap(),
        DatagramTiming::default(),
        status.clone(),
    );
    Harness {
        device,
        store,
        status,
        session,
    }
}

fn count_resets(rx: &mut tokio::sync::broadcast::Receiver<StateChange>) -> usize {
    let mut resets = 0;
    loop {
        match rx.try_recv() {
            Ok(StateChange::Reset) => resets += 1,
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(_) => return resets,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_initial_subscriptions_then_static_info_then_probe() {
    let h = start(DeviceModel::Em2);
    let profile = DatagramProfile::for_model(DeviceModel::Em2).unwrap();
    settle().await;

    assert_eq!(h.device.sent(), profile.subscriptions().to_vec());
    assert_eq!(h.status.current(), ConnectionStatus::Connecting);

    settle_for(1_000).await;
    let sent = h.device.sent();
    let statics = &sent[profile.subscriptions().len()..];
    assert_eq!(statics, profile.static_queries());

    settle_for(4_000).await;
    assert_eq!(h.device.sent().last(), Some(&json!({"device": {"name": null}})));
}

#[tokio::test(start_paused = true)]
async fn test_reply_within_window_updates_model_and_goes_online() {
    let h = start(DeviceModel::Em2);
    settle().await;

    h.session.send(json!({"rx1": {"mute": true}})).await.unwrap();
    h.device.reply(r#"{"rx1":{"mute":true}}"#);
    settle().await;

    assert_eq!(h.status.current(), ConnectionStatus::Ok);
    let muted = h.store.reader().read(|s| s.channel(0).and_then(|c| c.muted));
    assert_eq!(muted, Some(true));
    assert!(h.device.sent().contains(&json!({"rx1": {"mute": true}})));
}

#[tokio::test(start_paused = true)]
async fn test_silent_device_disconnects_exactly_once() {
    let h = start(DeviceModel::Em4);
    h.store
        .apply_text(&ReceiverDecoder, r#"{"device":{"name":"RACK"}}"#)
        .unwrap();
    let mut changes = h.store.subscribe();

    // Probes keep re-arming the watchdog for the whole window
    settle_for(30_000).await;

    assert_eq!(
        h.status.current(),
        ConnectionStatus::Disconnected(NOT_RESPONDING.to_string())
    );
    assert_eq!(count_resets(&mut changes), 1);
    assert_eq!(h.store.reader().snapshot(), DeviceState::new(DeviceModel::Em4));
}

#[tokio::test(start_paused = true)]
async fn test_answering_device_stays_online() {
    let h = start(DeviceModel::Em2);
    h.device.always_reply(r#"{"device":{"name":"RACK"}}"#);
    let mut changes = h.store.subscribe();

    settle_for(30_000).await;

    assert_eq!(h.status.current(), ConnectionStatus::Ok);
    assert_eq!(count_resets(&mut changes), 0);
    assert_eq!(
        h.store.reader().read(|s| s.device().name.clone()).as_deref(),
        Some("RACK")
    );
}

#[tokio::test(start_paused = true)]
async fn test_device_coming_back_goes_online_again() {
    let h = start(DeviceModel::Em2);
    settle_for(3_000).await;
    assert!(matches!(h.status.current(), ConnectionStatus::Disconnected(_)));

    h.device.reply(r#"{"rx2":{"gain":9}}"#);
    settle().await;

    assert_eq!(h.status.current(), ConnectionStatus::Ok);
    assert_eq!(h.store.reader().read(|s| s.channel(1).and_then(|c| c.gain)), Some(9));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_datagram_is_dropped() {
    let h = start(DeviceModel::Em2);
    settle().await;

    h.device.reply("{\"rx1\":");
    h.device.reply(r#"{"rx1":{"name":"VOX"}}"#);
    settle().await;

    assert_eq!(
        h.store.reader().read(|s| s.channel(0).and_then(|c| c.name.clone())).as_deref(),
        Some("VOX")
    );
}

#[tokio::test(start_paused = true)]
async fn test_charger_refreshes_every_nine_seconds() {
    let h = start(DeviceModel::Chg70n);
    settle().await;
    let profile = DatagramProfile::for_model(DeviceModel::Chg70n).unwrap();
    let subscriptions = profile.subscriptions().to_vec();

    settle_for(9_000).await;
    let resubscribed = h
        .device
        .sent()
        .iter()
        .filter(|doc| **doc == subscriptions[1])
        .count();
    assert_eq!(resubscribed, 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_all_timers() {
    let h = start(DeviceModel::Em2);
    settle().await;

    h.session.shutdown().await.unwrap();
    let after_shutdown = h.device.sent_count();

    settle_for(120_000).await;
    assert_eq!(h.device.sent_count(), after_shutdown);
}

#[tokio::test(start_paused = true)]
async fn test_sender_fails_after_shutdown() {
    let h = start(DeviceModel::Em2);
    let sender = h.session.sender();
    settle().await;

    assert_ok!(sender.send(json!({"rx2": {"mute": false}})).await);
    settle().await;
    assert_eq!(h.device.sent().last(), Some(&json!({"rx2": {"mute": false}})));

    h.session.shutdown().await.unwrap();
    assert!(matches!(
        sender.send(json!({"rx2": {"mute": true}})).await,
        Err(ewdx_stream::SessionError::Closed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_failing_receive_does_not_stall_commands() {
    let h = start(DeviceModel::Em2);
    h.device.set_recv_fails(true);
    settle().await;
    let before = h.device.sent_count();

    h.session.send(json!({"rx1": {"mute": true}})).await.unwrap();
    // The clock stays put; the command must not wait out the receive retry delay
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    assert_eq!(h.device.sent_count(), before + 1);
    assert_eq!(h.device.sent().last(), Some(&json!({"rx1": {"mute": true}})));
}
