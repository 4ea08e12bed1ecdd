use std::fs;
use std::path::{Path, PathBuf};

use readclass::io::load_blast_json;
use readclass::{ClassificationBatch, Classifier, ClassifierConfig};

const UPDATE_VAR: &str = "READCLASS_UPDATE_SNAPSHOTS";

fn tests_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}

pub fn fixture_path(name: &str) -> PathBuf {
    tests_dir().join("fixtures").join(name)
}

/// Load a BLAST JSON fixture and classify every item under `config`.
pub fn classify_fixture(name: &str, config: ClassifierConfig) -> ClassificationBatch {
    let items = load_blast_json(fixture_path(name))
        .unwrap_or_else(|err| panic!("fixture {name} does not load: {err:#}"));
    Classifier::new(config)
        .expect("fixture config is valid")
        .classify_batch(&items)
}

/// Compare a rendered report against `tests/snapshots/<name>`, row by row.
///
/// With `READCLASS_UPDATE_SNAPSHOTS` set the stored report is replaced instead.
pub fn assert_report(name: &str, actual: &str) {
    let path = tests_dir().join("snapshots").join(name);
    if std::env::var_os(UPDATE_VAR).is_some() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let stored = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("no stored report at {}; run with {UPDATE_VAR}=1", path.display()));
    let expected: Vec<&str> = stored.lines().collect();
    let actual: Vec<&str> = actual.lines().collect();

    if let Some(row) = (0..expected.len().max(actual.len())).find(|&i| expected.get(i) != actual.get(i)) {
        panic!(
            "{} differs at row {}\n  stored: {}\n  actual: {}\n({UPDATE_VAR}=1 regenerates)",
            path.display(),
            row + 1,
            expected.get(row).copied().unwrap_or("<missing>"),
            actual.get(row).copied().unwrap_or("<missing>"),
        );
    }
}
