//! Structural identity for object and array shapes.
//!
//! Canonicalization: field entries and array element tokens are sorted before
//! hashing, so neither source field order nor element order affects identity.
//! Separator bytes keep adjacent parts from ever concatenating ambiguously.

use sha1::{Digest as _, Sha1};

use crate::shape::{Digest, Field, ShapeId};

// part separator inside one canonical entry
const UNIT: char = '\u{1f}';

fn id_token(id: &ShapeId) -> &str {
    match id {
        ShapeId::Primitive(p) => p.token(),
        ShapeId::Digest(d) => &d.0,
    }
}

pub fn object_digest(fields: &[Field]) -> Digest {
    let mut entries: Vec<String> = fields
        .iter()
        .map(|field| {
            let mut types: Vec<&str> = field.types.iter().map(id_token).collect();
            types.sort_unstable();
            format!(
                "{}{UNIT}{}{UNIT}{}",
                field.name,
                field.optional as u8,
                types.join("|")
            )
        })
        .collect();
    entries.sort_unstable();
    digest_of("object", &entries)
}

pub fn array_digest(elems: &[ShapeId]) -> Digest {
    let mut tokens: Vec<String> = elems.iter().map(|id| id_token(id).to_string()).collect();
    tokens.sort_unstable();
    digest_of("array", &tokens)
}

fn digest_of(kind: &str, parts: &[String]) -> Digest {
    let mut hasher = Sha1::new();
    hasher.update(kind.as_bytes());
    hasher.update([0xFF]);
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0xFF]);
    }
    Digest(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Primitive;

    fn field(name: &str, optional: bool, ty: Primitive) -> Field {
        Field {
            name: name.to_string(),
            optional,
            types: vec![ShapeId::Primitive(ty)],
        }
    }

    #[test]
    fn digests_are_40_hex() {
        let d = object_digest(&[field("a", false, Primitive::String)]);
        assert_eq!(d.0.len(), 40);
        assert!(d.0.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn object_digest_ignores_field_order() {
        let ab = [field("a", false, Primitive::String), field("b", false, Primitive::Number)];
        let ba = [field("b", false, Primitive::Number), field("a", false, Primitive::String)];
        assert_eq!(object_digest(&ab), object_digest(&ba));
    }

    #[test]
    fn array_digest_ignores_element_order() {
        let ns = [ShapeId::Primitive(Primitive::Number), ShapeId::Primitive(Primitive::String)];
        let sn = [ShapeId::Primitive(Primitive::String), ShapeId::Primitive(Primitive::Number)];
        assert_eq!(array_digest(&ns), array_digest(&sn));
    }

    #[test]
    fn optionality_is_part_of_identity() {
        let required = [field("a", false, Primitive::String)];
        let optional = [field("a", true, Primitive::String)];
        assert_ne!(object_digest(&required), object_digest(&optional));
    }

    #[test]
    fn distinct_field_names_produce_distinct_digests() {
        let a = [field("a", false, Primitive::String)];
        let b = [field("b", false, Primitive::String)];
        assert_ne!(object_digest(&a), object_digest(&b));
    }
}
