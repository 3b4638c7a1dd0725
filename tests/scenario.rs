mod common;

use bubble_ist::render::{PathListing, TreeListing};
use bubble_ist::{ParentRule, NO_PARENT};
use test_case::test_case;

fn compact_path(path: &[usize], dimension: usize) -> Vec<String> {
    path.iter()
        .map(|&vertex| {
            bubble_ist::Permutation::unrank(vertex as u64, dimension)
                .unwrap()
                .compact()
        })
        .collect()
}

#[test_case(ParentRule::Recursive ; "recursive")]
#[test_case(ParentRule::Published ; "published")]
fn paths_from_4231(rule: ParentRule) {
    let (_, forest) = common::sequential_forest_with(4, rule);
    let start = common::vertex("4231");

    let expected: [&[&str]; 3] = [
        &["4231", "2431", "2341", "2314", "2134", "1234"],
        &["4231", "4321", "4312", "3412", "3142", "3124", "1324", "1234"],
        &["4231", "4213", "2413", "2143", "1243", "1234"],
    ];

    for (tree, expected) in forest.trees().iter().zip(expected) {
        let path = tree.path_to_root(start).expect("path reaches the root");
        assert!(path.len() <= 24);
        assert_eq!(compact_path(&path, 4), expected, "tree {}", tree.index());
    }
}

#[test]
fn path_ranks_from_4231() {
    let (_, forest) = common::sequential_forest(4);
    let paths: Vec<Vec<usize>> = forest
        .trees()
        .iter()
        .map(|tree| tree.path_to_root(21).unwrap())
        .collect();
    assert_eq!(paths[0], vec![21, 11, 9, 8, 6, 0]);
    assert_eq!(paths[1], vec![21, 23, 22, 16, 13, 12, 2, 0]);
    assert_eq!(paths[2], vec![21, 20, 10, 7, 1, 0]);
}

#[test]
fn example_path_rendering() {
    let (_, forest) = common::sequential_forest(4);
    let path = forest.tree(3).unwrap().path_to_root(21).unwrap();
    assert_eq!(
        PathListing::new(&path, 4).to_string(),
        "(4 2 3 1) -> (4 2 1 3) -> (2 4 1 3) -> (2 1 4 3) -> (1 2 4 3) -> (1 2 3 4)"
    );
}

#[test]
fn smallest_forest() {
    let (_, forest) = common::sequential_forest(3);
    assert_eq!(forest.tree_count(), 2);
    for tree in forest.trees() {
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.parents()[0], NO_PARENT);
        assert_eq!(tree.parent(0), None);
    }
    assert_eq!(forest.trees()[0].parents()[1..], [4, 0, 2, 5, 3]);
    assert_eq!(forest.trees()[1].parents()[1..], [0, 3, 5, 1, 4]);
}

#[test]
fn b3_tree_listing_snapshot() {
    let (_, forest) = common::sequential_forest(3);
    let listing: String = forest
        .trees()
        .iter()
        .map(|tree| TreeListing::new(tree, 3).to_string())
        .collect();
    common::assert_snapshot("b3_trees.txt", &listing);
}
