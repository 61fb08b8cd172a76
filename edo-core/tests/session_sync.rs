//! Session behaviour against a real JSON profile file.

use std::fs;

use edo_core::tuning::DEFAULT_DEGREES;
use edo_core::{JsonProfileStore, ProfileStore, StoredProfile, TuningEvent, TuningSession};

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn changes_are_written_through_to_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edo_profile.json");
    let mut session = TuningSession::open(JsonProfileStore::new(&path)).unwrap();

    session.set_degrees(names(&["C", "D", "E"])).unwrap();
    session.set_base_frequency(32.7).unwrap();

    let written: StoredProfile = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.notes, Some(names(&["C", "D", "E"])));
    assert_eq!(written.base_frequency, Some(32.7));

    // A new session (e.g. the next launch) starts from the file.
    let reopened = TuningSession::open(JsonProfileStore::new(&path)).unwrap();
    assert_eq!(reopened.tuning().degrees(), names(&["C", "D", "E"]).as_slice());
    assert!((reopened.tuning().note_to_frequency("E1").unwrap() - 32.7 * 2f64.powf(2000.0 / 1200.0)).abs() < 1e-9);
    assert!(!reopened.is_touched());
}

#[test]
fn no_op_degree_change_leaves_the_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edo_profile.json");
    let mut session = TuningSession::open(JsonProfileStore::new(&path)).unwrap();

    assert!(!session.set_degrees(DEFAULT_DEGREES.clone()).unwrap());
    assert!(!path.exists());
}

#[test]
fn emptied_degrees_stay_empty_in_session_but_not_on_relaunch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edo_profile.json");
    let mut session = TuningSession::open(JsonProfileStore::new(&path)).unwrap();

    session.set_degrees(Vec::new()).unwrap();
    assert_eq!(session.store().load().unwrap().notes, None);
    session.reload().unwrap();
    assert_eq!(session.tuning().degree_count(), 0);

    // A relaunch is untouched, so the absent list means defaults again.
    let relaunched = TuningSession::open(JsonProfileStore::new(&path)).unwrap();
    assert_eq!(relaunched.tuning().degree_count(), 12);
}

#[test]
fn reset_removes_both_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edo_profile.json");
    let mut session = TuningSession::open(JsonProfileStore::new(&path)).unwrap();
    let events = session.subscribe();

    session.set_base_frequency(20.0).unwrap();
    session.reset().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
    let last = events.try_iter().last().unwrap();
    assert!(matches!(last, TuningEvent::Reset(_)));
    assert_eq!(last.tuning().degree_count(), 12);
}

#[test]
fn concert_pitch_from_a_fresh_profile() {
    let dir = tempfile::tempdir().unwrap();
    let session = TuningSession::open(JsonProfileStore::new(dir.path().join("p.json"))).unwrap();
    let a4 = session.tuning().note_to_frequency("A4").unwrap();
    assert!((a4 - 440.0).abs() < 0.5);
}
