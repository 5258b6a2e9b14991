//! Session lifecycle: start refusals, cloud identity, stop and reset.

use std::sync::atomic::Ordering;
use std::time::Duration;

use revend::app::events::AppEvent;
use revend::app::service::StartRefusal;
use revend::session::SessionStatus;

use crate::mock_hw::{
    make_service, make_service_with, start_running, test_config, MockCamera, MockCloud, MockKiosk,
    MockModel, VecSink,
};

#[test]
fn start_is_refused_when_bin_is_full() {
    let (mut service, opens) = make_service();
    let mut hw = MockKiosk::new();
    // 2 cm headroom in a 30 cm bin is ~93 % full.
    hw.echo_distance_cm = Some(2.0);
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    let result = service.start(&mut hw, &mut cloud, &mut sink);

    assert_eq!(result, Err(StartRefusal::BinFull));
    assert_eq!(service.status(), SessionStatus::Idle);
    assert!(!service.camera_running());
    assert_eq!(opens.load(Ordering::SeqCst), 0);
    assert!(cloud.start_calls.is_empty());
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::StartRefused(StartRefusal::BinFull)]
    ));
}

#[test]
fn probe_fault_does_not_block_start() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    hw.echo_distance_cm = None;
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    assert_eq!(service.start(&mut hw, &mut cloud, &mut sink), Ok(()));
    assert_eq!(service.status(), SessionStatus::Running);
    service.reset(&mut sink);
}

#[test]
fn start_is_refused_without_a_camera() {
    let (mut service, _) =
        make_service_with(MockCamera::unavailable(), MockModel::plastic(), test_config());
    let mut hw = MockKiosk::new();
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    let result = service.start(&mut hw, &mut cloud, &mut sink);

    assert_eq!(result, Err(StartRefusal::NoCamera));
    assert_eq!(service.status(), SessionStatus::Idle);
}

#[test]
fn start_adopts_the_cloud_transaction_identity() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    service.start(&mut hw, &mut cloud, &mut sink).unwrap();

    assert_eq!(cloud.start_calls, vec!["BIN_01".to_owned()]);
    assert_eq!(service.session().transaction_id.as_deref(), Some("TX-100"));
    assert_eq!(service.session().claim_secret.as_deref(), Some("claim-abc"));
    assert_eq!(hw.tares, 1);
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::SessionStarted { offline: false, .. }]
    ));
    service.reset(&mut sink);
}

#[test]
fn unreachable_cloud_falls_back_to_offline_identity() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    let mut cloud = MockCloud::offline();
    let mut sink = VecSink::default();

    service.start(&mut hw, &mut cloud, &mut sink).unwrap();

    let id = service.session().transaction_id.clone().unwrap();
    assert!(id.starts_with("OFF-"), "unexpected id {id}");
    assert_eq!(service.status(), SessionStatus::Running);
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::SessionStarted { offline: true, .. }]
    ));
    service.reset(&mut sink);
}

#[test]
fn repeated_start_does_not_restart_anything() {
    let (mut service, opens) = make_service();
    let mut hw = MockKiosk::new();
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    service.start(&mut hw, &mut cloud, &mut sink).unwrap();
    service.start(&mut hw, &mut cloud, &mut sink).unwrap();

    assert_eq!(opens.load(Ordering::SeqCst), 1);
    assert_eq!(cloud.start_calls.len(), 1);
    assert_eq!(hw.tares, 1);
    service.reset(&mut sink);
}

#[test]
fn restart_after_reset_clears_the_counters() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::with_weights(&[20.0, 5.0]);
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    service.start(&mut hw, &mut cloud, &mut sink).unwrap();
    assert!(service.await_first_frame(Duration::from_secs(2)));
    service.scan(&mut hw, &mut sink).unwrap();
    assert_eq!(service.session().item_count(), 1);

    service.stop(&mut cloud, &mut sink);
    service.reset(&mut sink);
    // Result-screen data survives the reset until the next start.
    assert_eq!(service.session().item_count(), 1);

    service.start(&mut hw, &mut cloud, &mut sink).unwrap();
    assert_eq!(service.session().item_count(), 0);
    assert!(service.session().last_item.is_none());
    service.reset(&mut sink);
}

#[test]
fn stop_reports_counts_and_shows_the_result() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::with_weights(&[20.0, 5.0, 18.0, 4.0]);
    start_running(&mut service, &mut hw);
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    service.scan(&mut hw, &mut sink).unwrap();
    service.scan(&mut hw, &mut sink).unwrap();
    service.stop(&mut cloud, &mut sink);

    assert_eq!(service.status(), SessionStatus::ShowResult);
    // Camera keeps running on the result screen; reset releases it.
    assert!(service.camera_running());
    assert_eq!(cloud.stop_calls.len(), 1);
    let (id, plastic, cans) = cloud.stop_calls[0].clone();
    assert_eq!(plastic, 2);
    assert_eq!(cans, 0);
    assert!(!id.is_empty());
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::SessionStopped {
            plastic: 2,
            cans: 0,
            ..
        })
    ));
    service.reset(&mut sink);
}

#[test]
fn stop_outside_a_session_is_a_noop() {
    let (mut service, _) = make_service();
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();

    service.stop(&mut cloud, &mut sink);

    assert_eq!(service.status(), SessionStatus::Idle);
    assert!(cloud.stop_calls.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn reset_returns_to_idle_and_releases_the_camera() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    service.reset(&mut sink);

    assert_eq!(service.status(), SessionStatus::Idle);
    assert!(!service.camera_running());
    assert!(matches!(sink.events.as_slice(), [AppEvent::SessionReset]));
}

#[test]
fn state_snapshot_carries_the_ui_contract() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    hw.echo_distance_cm = Some(15.0);

    let snapshot = service.state_snapshot(&mut hw);
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["status"], "IDLE");
    assert_eq!(json["last_item"], "Ready");
    assert_eq!(json["plastic"], 0);
    assert_eq!(json["cans"], 0);
    assert_eq!(json["other"], 0);
    assert!(json["transaction_id"].is_null());
    let level = json["bin_level"].as_u64().unwrap();
    assert!((49..=51).contains(&level), "bin_level {level}");
    assert_eq!(json["bin_full"], false);
    assert_eq!(json["bin_error"], false);
}

#[test]
fn state_snapshot_flags_a_dead_bin_sensor() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    hw.echo_distance_cm = None;

    let snapshot = service.state_snapshot(&mut hw);

    assert_eq!(snapshot.bin_level, 0);
    assert!(!snapshot.bin_full);
    assert!(snapshot.bin_error);
}
