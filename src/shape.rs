//! Shape data model shared by every pipeline stage.
//!
//! A shape is the structural signature of a JSON value: the field set of an
//! object, or the element-shape set of an array, independent of actual data.
//! Non-primitive shapes are keyed by a structural digest so identical shapes
//! collapse to a single descriptor.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

/// Primitive type tokens. `Undefined` never comes from source JSON; it is
/// reserved for shapes synthesized while merging array elements. `Any` only
/// appears in rendered output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
}

impl Primitive {
    pub fn token(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
            Primitive::Any => "any",
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

/// 40-character lowercase hex digest of a canonical shape encoding.
/// Never collides with a primitive token's literal text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct Digest(pub String);

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of any shape: a primitive token or a structural digest.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Primitive(Primitive),
    Digest(Digest),
}

impl ShapeId {
    pub fn digest(&self) -> Option<&Digest> {
        match self {
            ShapeId::Digest(digest) => Some(digest),
            ShapeId::Primitive(_) => None,
        }
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ShapeId::Primitive(p) => serializer.serialize_str(p.token()),
            ShapeId::Digest(d) => serializer.serialize_str(&d.0),
        }
    }
}

/// One object field. `types` is an ordered, deduplicated union set; a
/// singleton in the common case, wider when array-element merging saw the
/// same field with different shapes.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Field {
    pub name: String,
    pub optional: bool,
    pub types: Vec<ShapeId>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ObjectShape {
    /// Declaration order: source order of the first-inserted descriptor.
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ArrayShape {
    /// Distinct element shapes observed across the array's members. After
    /// builder merging this is a singleton unless the elements form a true
    /// union of incompatible shapes.
    pub elems: Vec<ShapeId>,
}

impl ArrayShape {
    /// More than one non-mergeable element shape survived.
    pub fn is_union(&self) -> bool {
        self.elems.len() > 1
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Object(ObjectShape),
    Array(ArrayShape),
}

impl Shape {
    pub fn child_ids(&self) -> Vec<&ShapeId> {
        match self {
            Shape::Object(obj) => obj.fields.iter().flat_map(|f| f.types.iter()).collect(),
            Shape::Array(arr) => arr.elems.iter().collect(),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Shape::Object(obj) => Some(obj),
            Shape::Array(_) => None,
        }
    }
}

/// Descriptor collection, insertion-ordered so every downstream walk is
/// deterministic.
pub type ShapeMap = IndexMap<Digest, Shape>;

#[derive(Clone, Debug, serde::Serialize)]
pub struct TypeGraph {
    pub root: ShapeId,
    pub shapes: ShapeMap,
}

impl TypeGraph {
    /// Invariant lookup: after optimization every referenced digest must be
    /// present. A miss is a builder/optimizer bug, not a recoverable error.
    pub fn expect_shape(&self, digest: &Digest) -> &Shape {
        self.shapes
            .get(digest)
            .unwrap_or_else(|| panic!("shape graph invariant broken: missing descriptor {digest}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_ids_serialize_as_tokens() {
        let prim = ShapeId::Primitive(Primitive::Boolean);
        assert_eq!(serde_json::to_value(&prim).unwrap(), "boolean");

        let digest = ShapeId::Digest(Digest("ab".repeat(20)));
        assert_eq!(serde_json::to_value(&digest).unwrap(), "ab".repeat(20));
    }

    #[test]
    fn array_union_flag_is_derived() {
        let single = ArrayShape { elems: vec![ShapeId::Primitive(Primitive::String)] };
        assert!(!single.is_union());

        let union = ArrayShape {
            elems: vec![
                ShapeId::Primitive(Primitive::String),
                ShapeId::Primitive(Primitive::Number),
            ],
        };
        assert!(union.is_union());
    }
}
