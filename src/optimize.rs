//! Reachability sweep over the shape graph.
//!
//! Array-element merging leaves pre-merge descriptors behind, and those can
//! orphan further descriptors transitively, so the sweep runs a worklist to a
//! fixed point. The pruned graph is a separate allocation; the input graph is
//! consumed, never mutated in place.

use std::collections::HashSet;

use crate::shape::{Digest, ShapeMap, TypeGraph};

pub fn prune(graph: TypeGraph) -> TypeGraph {
    let mut visited: HashSet<Digest> = HashSet::new();
    let mut work: Vec<Digest> = graph.root.digest().cloned().into_iter().collect();

    while let Some(digest) = work.pop() {
        if !visited.insert(digest.clone()) {
            continue;
        }
        for child in graph.expect_shape(&digest).child_ids() {
            if let Some(d) = child.digest() {
                if !visited.contains(d) {
                    work.push(d.clone());
                }
            }
        }
    }

    let shapes: ShapeMap = graph
        .shapes
        .into_iter()
        .filter(|(digest, _)| visited.contains(digest))
        .collect();

    TypeGraph { root: graph.root, shapes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer;
    use serde_json::json;

    fn assert_no_dangling(graph: &TypeGraph) {
        for shape in graph.shapes.values() {
            for child in shape.child_ids() {
                if let Some(digest) = child.digest() {
                    assert!(graph.shapes.contains_key(digest), "dangling reference {digest}");
                }
            }
        }
        if let Some(digest) = graph.root.digest() {
            assert!(graph.shapes.contains_key(digest), "dangling root {digest}");
        }
    }

    #[test]
    fn merge_byproducts_are_swept() {
        let built = infer::build(&json!([{"id": 1}, {"id": 2, "note": "x"}])).unwrap();
        assert_eq!(built.shapes.len(), 4);

        let pruned = prune(built);
        // array + merged element shape
        assert_eq!(pruned.shapes.len(), 2);
        assert_no_dangling(&pruned);
    }

    #[test]
    fn nested_merges_prune_to_a_fixed_point() {
        let built = infer::build(&json!({
            "outer": [
                {"inner": [{"x": 1}]},
                {"inner": [{"x": 1}, {"x": 1, "y": 2}]}
            ]
        }))
        .unwrap();

        let before = built.shapes.len();
        let pruned = prune(built);
        assert!(pruned.shapes.len() < before);
        assert_no_dangling(&pruned);
    }

    #[test]
    fn graph_without_merges_is_unchanged() {
        let built = infer::build(&json!({"user": {"name": "Al"}, "tags": ["a"]})).unwrap();
        let before = built.shapes.len();
        let pruned = prune(built);
        assert_eq!(pruned.shapes.len(), before);
        assert_no_dangling(&pruned);
    }
}
