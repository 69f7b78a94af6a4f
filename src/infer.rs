//! Type structure builder.
//!
//! Walks a JSON value into a graph of shape descriptors keyed by structural
//! digest. Arrays of uniformly-object elements are merged into a single
//! element shape (union of fields, non-universal fields optional); anything
//! else keeps its distinct element shapes as a true union. Per-element
//! descriptors superseded by a merge stay in the map as byproducts of the
//! walk; the optimizer sweeps them afterward.

use serde_json::Value;

use crate::error::{ShapeError, ShapeResult};
use crate::hash;
use crate::shape::{ArrayShape, Field, ObjectShape, Primitive, Shape, ShapeId, ShapeMap, TypeGraph};

pub fn build(value: &Value) -> ShapeResult<TypeGraph> {
    check_root(value)?;
    let mut shapes = ShapeMap::new();
    let root = resolve(value, &mut shapes);
    Ok(TypeGraph { root, shapes })
}

/// Fail fast on unsupported roots, before any descriptor is created.
fn check_root(value: &Value) -> ShapeResult<()> {
    match value {
        Value::Object(_) => Ok(()),
        Value::Array(xs) if xs.is_empty() => Err(ShapeError::UnsupportedRoot("an empty array")),
        Value::Array(xs) if xs.iter().all(Value::is_object) => Ok(()),
        Value::Array(_) => Err(ShapeError::UnsupportedRoot("an array with non-object members")),
        Value::Null => Err(ShapeError::UnsupportedRoot("null")),
        Value::Bool(_) => Err(ShapeError::UnsupportedRoot("a boolean")),
        Value::Number(_) => Err(ShapeError::UnsupportedRoot("a number")),
        Value::String(_) => Err(ShapeError::UnsupportedRoot("a string")),
    }
}

fn resolve(value: &Value, shapes: &mut ShapeMap) -> ShapeId {
    match value {
        Value::Null => ShapeId::Primitive(Primitive::Null),
        Value::Bool(_) => ShapeId::Primitive(Primitive::Boolean),
        Value::Number(_) => ShapeId::Primitive(Primitive::Number),
        Value::String(_) => ShapeId::Primitive(Primitive::String),
        Value::Object(map) => {
            let fields = map
                .iter()
                .map(|(name, child)| Field {
                    name: name.clone(),
                    optional: false,
                    types: vec![resolve(child, shapes)],
                })
                .collect();
            insert_object(shapes, ObjectShape { fields })
        }
        Value::Array(xs) => {
            let mut elems: Vec<ShapeId> = Vec::new();
            for x in xs {
                let id = resolve(x, shapes);
                if !elems.contains(&id) {
                    elems.push(id);
                }
            }
            if elems.len() > 1 && elems.iter().all(|id| is_object(shapes, id)) {
                let merged = merge_objects(&elems, shapes);
                elems = vec![insert_object(shapes, merged)];
            }
            insert_array(shapes, ArrayShape { elems })
        }
    }
}

pub(crate) fn insert_object(shapes: &mut ShapeMap, obj: ObjectShape) -> ShapeId {
    let digest = hash::object_digest(&obj.fields);
    shapes.entry(digest.clone()).or_insert(Shape::Object(obj));
    ShapeId::Digest(digest)
}

pub(crate) fn insert_array(shapes: &mut ShapeMap, arr: ArrayShape) -> ShapeId {
    let digest = hash::array_digest(&arr.elems);
    shapes.entry(digest.clone()).or_insert(Shape::Array(arr));
    ShapeId::Digest(digest)
}

fn is_object(shapes: &ShapeMap, id: &ShapeId) -> bool {
    id.digest()
        .and_then(|d| shapes.get(d))
        .is_some_and(|shape| matches!(shape, Shape::Object(_)))
}

/// Union of every contributor's fields, first-seen order. A field missing
/// from at least one contributor (or optional in any) is optional; a field
/// seen with different shapes accumulates a type union.
fn merge_objects(elems: &[ShapeId], shapes: &ShapeMap) -> ObjectShape {
    let contributors: Vec<&ObjectShape> = elems
        .iter()
        .map(|id| {
            let digest = id.digest().expect("merge candidates are object digests");
            shapes[digest].as_object().expect("merge candidates are object shapes")
        })
        .collect();

    let mut fields: Vec<Field> = Vec::new();
    for obj in &contributors {
        for field in &obj.fields {
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(merged) => {
                    for ty in &field.types {
                        if !merged.types.contains(ty) {
                            merged.types.push(ty.clone());
                        }
                    }
                    merged.optional = merged.optional || field.optional;
                }
                None => fields.push(field.clone()),
            }
        }
    }

    for merged in &mut fields {
        let in_all = contributors
            .iter()
            .all(|obj| obj.fields.iter().any(|f| f.name == merged.name));
        if !in_all {
            merged.optional = true;
        }
    }

    ObjectShape { fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root_object<'a>(graph: &'a TypeGraph) -> &'a ObjectShape {
        let digest = graph.root.digest().expect("root is a shape digest");
        graph.expect_shape(digest).as_object().expect("root is an object")
    }

    #[test]
    fn scalars_resolve_to_primitive_tokens() {
        let graph = build(&json!({"a": 1, "b": "x", "c": true, "d": null})).unwrap();
        let obj = root_object(&graph);
        let tys: Vec<&ShapeId> = obj.fields.iter().map(|f| &f.types[0]).collect();
        assert_eq!(
            tys,
            vec![
                &ShapeId::Primitive(Primitive::Number),
                &ShapeId::Primitive(Primitive::String),
                &ShapeId::Primitive(Primitive::Boolean),
                &ShapeId::Primitive(Primitive::Null),
            ]
        );
    }

    #[test]
    fn field_order_follows_source() {
        let graph = build(&json!({"z": 1, "a": 2})).unwrap();
        let names: Vec<&str> = root_object(&graph).fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn identical_nested_objects_share_one_descriptor() {
        let graph = build(&json!({"user": {"name": "Al"}, "admin": {"name": "Bo"}})).unwrap();
        let obj = root_object(&graph);
        assert_eq!(obj.fields[0].types, obj.fields[1].types);
        // root + the single shared inner shape
        assert_eq!(graph.shapes.len(), 2);
    }

    #[test]
    fn array_of_objects_merges_with_optionality() {
        let graph = build(&json!([{"id": 1}, {"id": 2, "note": "x"}])).unwrap();
        let digest = graph.root.digest().unwrap();
        let Shape::Array(arr) = graph.expect_shape(digest) else { panic!("root is an array") };
        assert!(!arr.is_union(), "object elements must merge into one shape");

        let merged_digest = arr.elems[0].digest().unwrap();
        let merged = graph.expect_shape(merged_digest).as_object().unwrap();
        let id = merged.fields.iter().find(|f| f.name == "id").unwrap();
        let note = merged.fields.iter().find(|f| f.name == "note").unwrap();
        assert!(!id.optional);
        assert!(note.optional);

        // pre-merge element descriptors remain as byproducts of the walk
        assert_eq!(graph.shapes.len(), 4);
    }

    #[test]
    fn conflicting_merged_field_types_become_a_union() {
        let graph = build(&json!([{"id": 1}, {"id": "x"}])).unwrap();
        let digest = graph.root.digest().unwrap();
        let Shape::Array(arr) = graph.expect_shape(digest) else { panic!("root is an array") };
        let merged = graph.expect_shape(arr.elems[0].digest().unwrap()).as_object().unwrap();
        assert_eq!(
            merged.fields[0].types,
            vec![
                ShapeId::Primitive(Primitive::Number),
                ShapeId::Primitive(Primitive::String),
            ]
        );
    }

    #[test]
    fn mixed_array_stays_a_true_union() {
        let graph = build(&json!({"v": [1, "a", {"k": true}]})).unwrap();
        let obj = root_object(&graph);
        let arr_digest = obj.fields[0].types[0].digest().unwrap();
        let Shape::Array(arr) = graph.expect_shape(arr_digest) else { panic!("field is an array") };
        assert!(arr.is_union());
        assert_eq!(arr.elems.len(), 3);
    }

    #[test]
    fn duplicate_array_elements_deduplicate() {
        let graph = build(&json!({"tags": ["a", "b", "c"]})).unwrap();
        let obj = root_object(&graph);
        let arr_digest = obj.fields[0].types[0].digest().unwrap();
        let Shape::Array(arr) = graph.expect_shape(arr_digest) else { panic!("field is an array") };
        assert_eq!(arr.elems, vec![ShapeId::Primitive(Primitive::String)]);
    }

    #[test]
    fn unsupported_roots_are_rejected_before_building() {
        for bad in [json!(1), json!("x"), json!(true), json!(null), json!([]), json!([1, 2]), json!([{"a": 1}, 2])] {
            assert!(matches!(build(&bad), Err(ShapeError::UnsupportedRoot(_))), "accepted {bad}");
        }
    }
}
