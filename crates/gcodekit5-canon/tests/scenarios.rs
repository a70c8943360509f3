//! End-to-end scenarios driving the public `CanonEngine` dispatch API,
//! matching the six literal scenarios from the canonical-motion
//! specification's testable-properties section.

use gcodekit5_canon::axis::{AxisMask, StaticAxisLimits};
use gcodekit5_canon::engine::CanonEngine;
use gcodekit5_canon::message::{LinearTag, MotionMessage};
use gcodekit5_canon::state::MotionMode;
use gcodekit5_canon::units::{LengthUnits, Pose};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn limits() -> StaticAxisLimits {
    StaticAxisLimits::uniform(100.0, 1000.0, 10000.0, AxisMask::XYZ)
}

fn engine_with_defaults(naivecam_tolerance: f64) -> CanonEngine {
    let mut engine = CanonEngine::new();
    engine.set_motion_control_mode(&limits(), MotionMode::Continuous, 0.0);
    engine.set_naivecam_tolerance(naivecam_tolerance);
    engine.set_feed_rate(&limits(), 10.0, 10.0);
    engine.drain_messages();
    engine
}

#[test]
fn scenario_one_set_feed_rate_then_straight_feed() {
    init_tracing();
    let mut engine = engine_with_defaults(0.1);
    engine.straight_feed(&limits(), 10, Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    engine.finish(&limits());

    assert_eq!(engine.interpreter_list().len(), 1);
    match &engine.interpreter_list()[0].payload {
        MotionMessage::LinearMove { end, vel, ini_max_vel, acc, ini_max_jerk, feed_mode, tag } => {
            assert_eq!(end.x, 10.0);
            assert_eq!(*vel, 10.0);
            assert_eq!(*ini_max_vel, 100.0);
            assert_eq!(*acc, 1000.0);
            assert_eq!(*ini_max_jerk, 10000.0);
            assert_eq!(*feed_mode, 0);
            assert_eq!(*tag, LinearTag::Feed);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn scenario_two_fusion_holds_within_tolerance() {
    init_tracing();
    let mut engine = engine_with_defaults(0.1);
    engine.straight_feed(&limits(), 1, Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    engine.straight_feed(&limits(), 2, Pose::new(20.0, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    engine.straight_feed(&limits(), 3, Pose::new(30.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    assert!(engine.interpreter_list().is_empty(), "all three points stay fused, nothing flushed yet");

    engine.finish(&limits());
    assert_eq!(engine.interpreter_list().len(), 1);
    match &engine.interpreter_list()[0].payload {
        MotionMessage::LinearMove { end, .. } => assert_eq!(end.x, 30.0),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn scenario_three_tighter_tolerance_forces_an_early_flush() {
    // With naivecamTolerance = 0.01, every successive candidate deviates from
    // its predecessor's chord by ~0.025-0.05, so each feed below flushes the
    // one before it instead of fusing — the tight tolerance defeats fusion
    // entirely for this sequence (vs. tolerance 0.1 in scenario two, where
    // all three points stay fused until `finish`).
    init_tracing();
    let mut engine = engine_with_defaults(0.01);
    engine.straight_feed(&limits(), 1, Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    engine.straight_feed(&limits(), 2, Pose::new(20.0, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    engine.straight_feed(&limits(), 3, Pose::new(30.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));

    assert_eq!(engine.interpreter_list().len(), 2, "each feed flushed its predecessor");
    match &engine.interpreter_list()[0].payload {
        MotionMessage::LinearMove { end, .. } => assert_eq!(end.x, 10.0),
        other => panic!("unexpected message: {other:?}"),
    }
    match &engine.interpreter_list()[1].payload {
        MotionMessage::LinearMove { end, .. } => assert_eq!((end.x, end.y), (20.0, 0.05)),
        other => panic!("unexpected message: {other:?}"),
    }

    engine.finish(&limits());
    assert_eq!(engine.interpreter_list().len(), 3);
    match &engine.interpreter_list()[2].payload {
        MotionMessage::LinearMove { end, .. } => assert_eq!(end.x, 30.0),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn scenario_four_arc_feed_in_xy_plane() {
    init_tracing();
    let mut engine = engine_with_defaults(0.1);
    engine
        .arc_feed(&limits(), 20, 10.0, 0.0, 5.0, 0.0, 1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
        .expect("arc feed from (0,0) around center (5,0) is well-formed");

    assert_eq!(engine.interpreter_list().len(), 1);
    match &engine.interpreter_list()[0].payload {
        MotionMessage::CircularMove { end, center, normal, turn, .. } => {
            assert_eq!(end.x, 10.0);
            assert_eq!(*center, (5.0, 0.0, 0.0));
            assert_eq!(*normal, (0.0, 0.0, 1.0));
            assert_eq!(*turn, 0);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn scenario_five_inch_units_scale_the_traverse() {
    init_tracing();
    let mut engine = engine_with_defaults(0.1);
    engine.use_length_units(&limits(), LengthUnits::Inches);
    engine.straight_traverse(&limits(), 1, Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));

    assert_eq!(engine.end_point().x, 25.4);
    match &engine.interpreter_list()[0].payload {
        MotionMessage::LinearMove { end, tag, .. } => {
            assert_eq!(*tag, LinearTag::Traverse);
            assert_eq!(end.x, 25.4 * engine.state().external_length_units);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn scenario_six_xy_rotation_round_trips_through_external_position() {
    init_tracing();
    let mut engine = engine_with_defaults(0.1);
    engine.set_xy_rotation(&limits(), 90.0);
    engine.straight_feed(&limits(), 1, Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    engine.finish(&limits());

    assert!(engine.end_point().x.abs() < 1e-9);
    assert!((engine.end_point().y - 1.0).abs() < 1e-9);
}
