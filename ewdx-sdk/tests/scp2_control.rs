//! SCPv2 receiver commands against a mock device over plain HTTP.

use std::sync::Arc;

use ewdx_sdk::{DeviceControl, DeviceModel, GainDirection, MuteConfig, Scp2Receiver, SdkError, SyncSetting};
use ewdx_state::{DeviceStore, StateError};
use mockito::{Matcher, Server};
use serde_json::json;
use ssc_client::{RestClient, RestConfig, DEFAULT_TIMEOUT};

fn controller(server: &Server, model: DeviceModel) -> Scp2Receiver {
    let config = RestConfig {
        base_url: url::Url::parse(&server.url()).unwrap(),
        password: "secret".to_string(),
        timeout: DEFAULT_TIMEOUT,
        accept_invalid_certs: false,
    };
    let rest = Arc::new(RestClient::new(config).unwrap());
    let store = DeviceStore::new(model);
    Scp2Receiver::new(rest, store.reader())
}

#[tokio::test]
async fn test_mute_is_a_channel_put() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/channel/1")
        .match_body(Matcher::Json(json!({"channel": {"mute": true}})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    control.set_mute(1, true).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_channel_name_is_uppercased_and_truncated() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/channel/0")
        .match_body(Matcher::Json(json!({"name": "LEAD VOC"})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    control.set_channel_name(0, "lead vocals").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_gain_snaps_to_table() {
    let mut server = Server::new_async().await;
    let set = server
        .mock("PUT", "/api/channel/0")
        .match_body(Matcher::Json(json!({"channel": {"gain": 42}})))
        .with_status(204)
        .create_async()
        .await;
    let stepped = server
        .mock("PUT", "/api/channel/1")
        .match_body(Matcher::Json(json!({"channel": {"gain": 6}})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    control.set_gain(0, 60).await.unwrap();
    // Unknown current gain counts as 0 dB
    control.adjust_gain(1, GainDirection::Up, 2).await.unwrap();

    set.assert_async().await;
    stepped.assert_async().await;
}

#[tokio::test]
async fn test_frequency_is_clamped() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/rf/channels/0/frequency")
        .match_body(Matcher::Json(json!({"frequency": 470200})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    control.set_frequency(0, 100_000).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_sync_settings_and_ignore_flags() {
    let mut server = Server::new_async().await;
    let mute_config = server
        .mock("PUT", "/api/syncSettings/3")
        .match_body(Matcher::Json(json!({"muteConfig": MuteConfig::AfMute.scp2()})))
        .with_status(204)
        .create_async()
        .await;
    let ignore = server
        .mock("PUT", "/api/syncSettings/3/ignore")
        .match_body(Matcher::Json(json!({SyncSetting::Trim.scp2(): true})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em4);
    control.set_mute_config(3, MuteConfig::AfMute).await.unwrap();
    control.set_sync_ignore(3, SyncSetting::Trim, true).await.unwrap();

    mute_config.assert_async().await;
    ignore.assert_async().await;
}

#[tokio::test]
async fn test_device_auto_lock_sets_each_channel_lock() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("PUT", "/api/syncSettings/0")
        .match_body(Matcher::Json(json!({"lock": true})))
        .with_status(204)
        .create_async()
        .await;
    let second = server
        .mock("PUT", "/api/syncSettings/1")
        .match_body(Matcher::Json(json!({"lock": true})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    control.set_auto_lock(true).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_site_writes() {
    let mut server = Server::new_async().await;
    let name = server
        .mock("PUT", "/api/device/site")
        .match_body(Matcher::Json(json!({"device": {"name": "STAGE-L"}})))
        .with_status(204)
        .create_async()
        .await;
    let location = server
        .mock("PUT", "/api/device/site")
        .match_body(Matcher::Json(json!({"location": "Rack 2"})))
        .with_status(204)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    control.set_name("STAGE-L").await.unwrap();
    control.set_location("Rack 2").await.unwrap();

    name.assert_async().await;
    location.assert_async().await;
}

#[tokio::test]
async fn test_rejected_write_is_not_an_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/channel/0/identify")
        .with_status(500)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    assert!(control.set_channel_identification(0, true).await.is_ok());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_out_of_range_channel_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let control = controller(&server, DeviceModel::Em2);
    let err = control.set_mute(2, true).await.unwrap_err();

    assert!(matches!(
        err,
        SdkError::State(StateError::ChannelOutOfRange { index: 2, count: 2 })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_charger_only_operations_are_unsupported() {
    let server = Server::new_async().await;
    let control = controller(&server, DeviceModel::Em4);

    assert!(matches!(
        control.set_bay_identify(0, true).await,
        Err(SdkError::Unsupported { operation: "set_bay_identify", model: DeviceModel::Em4 })
    ));
}
