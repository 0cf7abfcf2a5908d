use potstat_config::{ElectrodeCfg, ElectrodeKey, Journal};
use tempfile::tempdir;

fn props(mass: f64) -> ElectrodeCfg {
    ElectrodeCfg {
        mass_mg: mass,
        capacity_mah_g: 372.0,
        ..ElectrodeCfg::default()
    }
}

#[test]
fn missing_file_is_an_empty_journal() {
    let dir = tempdir().unwrap();
    let j = Journal::load(&dir.path().join("nope.toml")).unwrap();
    assert!(j.entries.is_empty());
}

#[test]
fn upsert_assigns_ids_and_replaces_by_key() {
    let mut j = Journal::default();
    let a = j.upsert("run-a", 1_700_000_000, ElectrodeKey::Working, props(2.0));
    let b = j.upsert("run-a", 1_700_000_000, ElectrodeKey::Counter, props(8.0));
    let c = j.upsert("run-b", 1_700_003_600, ElectrodeKey::Working, props(3.0));
    assert_eq!((a, b, c), (1, 2, 3));

    let again = j.upsert("run-a", 1_700_000_000, ElectrodeKey::Working, props(2.2));
    assert_eq!(again, 1);
    assert_eq!(j.entries.len(), 3);
    let hit = j
        .lookup("run-a", 1_700_000_000, ElectrodeKey::Working)
        .unwrap();
    assert_eq!(hit.properties.mass_mg, 2.2);
    // same file, different start: a different run
    assert!(j.lookup("run-a", 0, ElectrodeKey::Working).is_none());
}

#[test]
fn delete_then_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.toml");
    let mut j = Journal::default();
    j.upsert("run-a", 10, ElectrodeKey::Working, props(2.0));
    j.upsert("run-b", 20, ElectrodeKey::Working, props(3.0));
    assert!(j.delete(1));
    assert!(!j.delete(1));
    j.save(&path).unwrap();

    let back = Journal::load(&path).unwrap();
    assert_eq!(back, j);
    assert_eq!(back.entries[0].id, 2);
    // ids keep counting past deleted ones
    let mut back = back;
    assert_eq!(back.upsert("run-c", 30, ElectrodeKey::Counter, props(1.0)), 3);
}

#[test]
fn corrupt_journal_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.toml");
    std::fs::write(&path, "entries = 5").unwrap();
    let err = Journal::load(&path).unwrap_err();
    assert!(format!("{err}").contains("parse journal"));
}
