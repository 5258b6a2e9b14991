//! The scan pipeline end to end: weigh, photograph, classify, fuse, sort.

use revend::app::events::AppEvent;
use revend::app::service::ScanError;
use revend::session::Label;

use crate::mock_hw::{
    make_service, make_service_with, start_running, test_config, ActuatorCall, MockCamera,
    MockCloud, MockKiosk, MockModel, VecSink,
};

#[test]
fn plastic_item_runs_the_full_pipeline() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::with_weights(&[20.0, 5.0]);
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    let outcome = service.scan(&mut hw, &mut sink).unwrap();

    assert_eq!(outcome.label, Label::Plastic);
    assert!((outcome.item_weight_g - 15.0).abs() < 1e-4);

    // Flash brackets the frame grab, then the sort choreography runs.
    assert_eq!(hw.calls[0], ActuatorCall::Lights((255, 150, 255)));
    assert_eq!(hw.calls[1], ActuatorCall::Lights((0, 0, 0)));
    let servos: Vec<_> = hw
        .servo_calls()
        .iter()
        .map(|c| match c {
            ActuatorCall::Servo { channel, angle } => (*channel, *angle),
            ActuatorCall::Lights(_) => unreachable!(),
        })
        .collect();
    assert_eq!(
        servos,
        vec![
            (15, Some(95.0)),
            (0, Some(160.0)),
            (0, Some(65.0)),
            (15, Some(60.0)),
            (15, None),
            (0, None),
        ]
    );

    assert_eq!(service.session().plastic_count, 1);
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::ItemScanned {
            fused: Label::Plastic,
            ..
        }]
    ));
    service.reset(&mut sink);
}

#[test]
fn metal_can_swings_the_arm_to_the_can_side() {
    let (mut service, _) =
        make_service_with(MockCamera::new(), MockModel::can(), test_config());
    let mut hw = MockKiosk::with_weights(&[14.0, 0.0]);
    hw.metal = true;
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    let outcome = service.scan(&mut hw, &mut sink).unwrap();

    assert_eq!(outcome.label, Label::Can);
    assert_eq!(
        hw.servo_calls()[0],
        &ActuatorCall::Servo {
            channel: 15,
            angle: Some(25.0)
        }
    );
    assert_eq!(service.session().can_count, 1);
    service.reset(&mut sink);
}

#[test]
fn metal_reading_overrides_a_plastic_verdict() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::with_weights(&[14.0, 0.0]);
    hw.metal = true;
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    let outcome = service.scan(&mut hw, &mut sink).unwrap();

    assert_eq!(outcome.label, Label::Can);
    assert_eq!(
        hw.servo_calls()[0],
        &ActuatorCall::Servo {
            channel: 15,
            angle: Some(25.0)
        }
    );
    service.reset(&mut sink);
}

#[test]
fn can_without_metal_is_rejected_to_other() {
    let (mut service, _) =
        make_service_with(MockCamera::new(), MockModel::can(), test_config());
    let mut hw = MockKiosk::with_weights(&[14.0, 14.0]);
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    let outcome = service.scan(&mut hw, &mut sink).unwrap();

    assert_eq!(outcome.label, Label::Other);
    // Rejected items stay on the platform for the user to take back.
    assert!(hw.servo_calls().is_empty());
    assert_eq!(service.session().other_count, 1);
    service.reset(&mut sink);
}

#[test]
fn overweight_item_is_rejected_regardless_of_class() {
    let (mut service, _) =
        make_service_with(MockCamera::new(), MockModel::can(), test_config());
    let mut hw = MockKiosk::with_weights(&[80.0, 80.0]);
    hw.metal = true;
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    let outcome = service.scan(&mut hw, &mut sink).unwrap();

    assert_eq!(outcome.label, Label::Other);
    assert!(hw.servo_calls().is_empty());
    service.reset(&mut sink);
}

#[test]
fn scan_outside_a_session_is_rejected() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::new();
    let mut sink = VecSink::default();

    assert_eq!(service.scan(&mut hw, &mut sink), Err(ScanError::NotRunning));
    assert_eq!(service.session().item_count(), 0);
    assert!(hw.calls.is_empty());
}

#[test]
fn missing_frame_aborts_the_scan_without_side_effects() {
    let (mut service, _) = make_service_with(
        MockCamera::failing_reads(),
        MockModel::plastic(),
        test_config(),
    );
    let mut hw = MockKiosk::with_weights(&[20.0, 5.0]);
    let mut cloud = MockCloud::online();
    let mut sink = VecSink::default();
    service.start(&mut hw, &mut cloud, &mut sink).unwrap();
    sink.events.clear();

    let result = service.scan(&mut hw, &mut sink);

    assert_eq!(result, Err(ScanError::NoFrame));
    assert_eq!(service.session().item_count(), 0);
    assert!(hw.servo_calls().is_empty());
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::ScanFailed(ScanError::NoFrame)]
    ));
    service.reset(&mut sink);
}

#[test]
fn classifier_fault_records_the_item_as_other() {
    let (mut service, _) = make_service_with(
        MockCamera::new(),
        MockModel::failing(),
        test_config(),
    );
    let mut hw = MockKiosk::with_weights(&[10.0, 0.0]);
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    let outcome = service.scan(&mut hw, &mut sink).unwrap();

    assert_eq!(outcome.label, Label::Other);
    assert_eq!(service.session().other_count, 1);
    service.reset(&mut sink);
}

#[test]
fn successive_scans_accumulate_in_the_session() {
    let (mut service, _) = make_service();
    let mut hw = MockKiosk::with_weights(&[20.0, 5.0, 18.0, 4.0, 16.0, 2.0]);
    start_running(&mut service, &mut hw);
    let mut sink = VecSink::default();

    for _ in 0..3 {
        service.scan(&mut hw, &mut sink).unwrap();
    }

    let session = service.session();
    assert_eq!(session.item_count(), 3);
    assert_eq!(session.plastic_count, 3);
    assert!((session.total_weight_g - (15.0 + 14.0 + 14.0)).abs() < 1e-3);
    assert_eq!(session.last_item, Some(Label::Plastic));
    service.reset(&mut sink);
}
