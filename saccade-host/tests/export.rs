use saccade_core::config::RigConfig;
use saccade_core::profile::{analyze, MotionProfile};
use saccade_host::config::Backend;
use saccade_host::export::{load_samples, save_samples, ExportError, HEADER};
use saccade_host::profiler::{profile_move, ProfileRequest};
use saccade_host::rig::build_controller;

#[test]
fn test_saved_profile_reloads_and_reanalyzes() {
    let rig = RigConfig::absolute_single_eye(90.0, 90.0);
    let mut controller = build_controller(rig.clone(), Backend::Sim, false);
    let request = ProfileRequest {
        pan: -8.0,
        tilt: 4.0,
        acceleration: 2000.0,
        max_velocity: 400.0,
    };
    let run = profile_move(&mut controller, &request).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.csv");
    save_samples(&path, &run.profile.samples).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some(HEADER.join(",").as_str()));
    assert_eq!(text.lines().count(), run.profile.len() + 1);

    let samples = load_samples(&path).unwrap();
    assert_eq!(samples.as_slice(), run.profile.samples.as_slice());

    // Re-imported data gives the same statistics
    let reloaded = MotionProfile::from_samples(run.target, samples, run.profile.stop);
    let pan = rig.left.pan.as_ref().unwrap();
    let tilt = rig.left.tilt.as_ref().unwrap();
    assert_eq!(analyze(&reloaded, pan, tilt), run.summary);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_samples(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
}
