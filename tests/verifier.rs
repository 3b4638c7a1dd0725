mod common;

use bubble_ist::{
    check_independence, validate, verify_forest, Forest, IstError, SpanningTree, Violation,
    NO_PARENT,
};

fn corrupt(forest: &Forest, tree: usize, edits: &[(usize, u32)]) -> Forest {
    let trees = forest
        .trees()
        .iter()
        .map(|original| {
            let mut parents = original.parents().to_vec();
            if original.index() == tree {
                for &(vertex, parent) in edits {
                    parents[vertex] = parent;
                }
            }
            SpanningTree::from_parents(original.index(), parents)
        })
        .collect();
    Forest::from_trees(forest.dimension(), trees)
}

#[test]
fn out_of_range_parent() {
    let (network, forest) = common::sequential_forest(4);
    let corrupted = corrupt(&forest, 1, &[(5, 99)]);
    assert_eq!(
        validate(&corrupted.trees()[0], &network),
        Err(Violation::InvalidParent {
            tree: 1,
            vertex: 5,
            parent: 99
        })
    );
}

#[test]
fn non_neighbor_parent() {
    let (network, forest) = common::sequential_forest(4);
    // 4231 and 1234 differ in two non-adjacent positions.
    let vertex = common::vertex("4231");
    let corrupted = corrupt(&forest, 2, &[(vertex, 0)]);
    assert_eq!(
        validate(&corrupted.trees()[1], &network),
        Err(Violation::NotNeighbor {
            tree: 2,
            vertex,
            parent: 0
        })
    );
}

#[test]
fn missing_parent_is_out_of_range() {
    let (network, forest) = common::sequential_forest(3);
    let corrupted = corrupt(&forest, 1, &[(3, NO_PARENT)]);
    assert!(matches!(
        validate(&corrupted.trees()[0], &network),
        Err(Violation::InvalidParent { vertex: 3, .. })
    ));
}

#[test]
fn truncated_tree() {
    let (network, forest) = common::sequential_forest(3);
    let tree = SpanningTree::from_parents(1, forest.trees()[0].parents()[..4].to_vec());
    assert_eq!(
        validate(&tree, &network),
        Err(Violation::SizeMismatch {
            tree: 1,
            actual: 4,
            expected: 6
        })
    );
}

#[test]
fn cycle_is_reported() {
    let (network, forest) = common::sequential_forest(3);
    // In B_3, 132 (1) and 312 (4) are neighbours.
    let corrupted = corrupt(&forest, 2, &[(1, 4), (4, 1)]);
    assert!(matches!(
        verify_forest(&corrupted, &network),
        Err(Violation::Cycle { tree: 2, .. })
    ));
}

#[test]
fn shared_path_vertex() {
    let (network, forest) = common::sequential_forest(3);
    // Copying tree 1 into tree 2 keeps both trees valid but makes every path
    // longer than one edge shared.
    let copy = SpanningTree::from_parents(2, forest.trees()[0].parents().to_vec());
    let twins = Forest::from_trees(3, vec![forest.trees()[0].clone(), copy]);
    assert_eq!(validate(&twins.trees()[1], &network), Ok(()));
    assert!(matches!(
        check_independence(&twins, &network),
        Err(Violation::SharedVertex {
            first: 1,
            second: 2,
            ..
        })
    ));
}

#[test]
fn violation_converts_into_error() {
    let violation = Violation::Cycle { tree: 2, vertex: 7 };
    let error: IstError = violation.clone().into();
    assert!(matches!(error, IstError::StructuralViolation(ref inner) if *inner == violation));
    assert_eq!(error.to_string(), "Cycle detected at vertex 7 (tree 2)");
}
