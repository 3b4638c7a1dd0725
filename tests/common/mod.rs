#![allow(dead_code)]

use std::fs;
use std::path::Path;

use bubble_ist::{construct_sequential, BubbleSortNetwork, Forest, ParentRule};

const SNAPSHOT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/snapshots");

/// Compare `actual` with `tests/snapshots/<name>` line by line.
///
/// With `BUBBLE_IST_UPDATE_SNAPSHOTS` set the file is rewritten instead. On a
/// mismatch the output is left in `<name>.new` for inspection.
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = Path::new(SNAPSHOT_DIR).join(name);
    if std::env::var_os("BUBBLE_IST_UPDATE_SNAPSHOTS").is_some() {
        fs::create_dir_all(SNAPSHOT_DIR).expect("create snapshot directory");
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read snapshot {}: {}", path.display(), err));
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    for line in 1.. {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => return,
            (want, got) if want == got => continue,
            (want, got) => {
                let fresh = path.with_extension("new");
                fs::write(&fresh, actual).expect("write new snapshot");
                panic!(
                    "{} differs at line {}\n  expected: {:?}\n  actual:   {:?}\nfull output in {}",
                    name,
                    line,
                    want,
                    got,
                    fresh.display()
                );
            }
        }
    }
}

pub fn network(dimension: usize) -> BubbleSortNetwork {
    BubbleSortNetwork::build(dimension).expect("network builds")
}

pub fn sequential_forest(dimension: usize) -> (BubbleSortNetwork, Forest) {
    sequential_forest_with(dimension, ParentRule::Recursive)
}

pub fn sequential_forest_with(dimension: usize, rule: ParentRule) -> (BubbleSortNetwork, Forest) {
    let network = network(dimension);
    let forest = construct_sequential(&network, rule).expect("sequential construction");
    (network, forest)
}

/// Parse a compact permutation such as `"4231"` into its vertex id.
pub fn vertex(compact: &str) -> usize {
    compact
        .parse::<bubble_ist::Permutation>()
        .expect("valid permutation")
        .rank() as usize
}
