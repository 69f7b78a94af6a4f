//! Interface synthesis.
//!
//! Renders every named object shape as a TypeScript-style `interface` block.
//! Field types resolve through the name table (primitive tokens kept
//! verbatim, digests replaced by assigned names or memoized array
//! expressions), then get display-level normalization: a union carrying an
//! `undefined` branch drops the branch and marks the field optional, and a
//! bare `undefined` widens to `any`. Only the root entry is exported; nested
//! interfaces are referenced by name within the same output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ShapeResult;
use crate::naming::{self, NameTable};
use crate::shape::{Field, Primitive, Shape, TypeGraph};
use crate::{infer, optimize};

static BARE_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Full pipeline: build → prune → name → render. Returns the declaration
/// list root-first, each block ready to be joined with blank lines.
pub fn generate(value: &Value, root_name: &str) -> ShapeResult<Vec<String>> {
    let graph = optimize::prune(infer::build(value)?);
    let names = naming::assign_names(&graph, root_name)?;
    Ok(declarations(&graph, &names))
}

pub fn declarations(graph: &TypeGraph, names: &NameTable) -> Vec<String> {
    interface_descriptors(graph, names).iter().map(render).collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub export: bool,
    pub fields: Vec<FieldDecl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub key: String,
    pub optional: bool,
    pub ty: String,
}

pub fn interface_descriptors(graph: &TypeGraph, names: &NameTable) -> Vec<InterfaceDescriptor> {
    names
        .entries
        .iter()
        .filter_map(|entry| {
            // entries only ever point at object shapes; arrays render inline
            let Shape::Object(obj) = graph.expect_shape(&entry.id) else { return None };
            Some(InterfaceDescriptor {
                name: entry.name.clone(),
                export: entry.root,
                fields: obj.fields.iter().map(|f| field_decl(f, names)).collect(),
            })
        })
        .collect()
}

fn field_decl(field: &Field, names: &NameTable) -> FieldDecl {
    let mut ty = field
        .types
        .iter()
        .map(|id| names.display(id).to_string())
        .collect::<Vec<_>>()
        .join(" | ");
    let mut optional = field.optional;

    let undefined = Primitive::Undefined.token();
    if ty == undefined {
        ty = Primitive::Any.token().to_string();
        optional = true;
    } else if naming::is_top_level_union(&ty) {
        let branches = naming::split_top_level_union(&ty);
        if branches.iter().any(|b| *b == undefined) {
            ty = branches
                .into_iter()
                .filter(|b| *b != undefined)
                .collect::<Vec<_>>()
                .join(" | ");
            optional = true;
        }
    }

    FieldDecl { key: field.name.clone(), optional, ty }
}

pub fn render(ifc: &InterfaceDescriptor) -> String {
    let export = if ifc.export { "export " } else { "" };
    let mut lines = vec![format!("{export}interface {} {{", ifc.name)];
    for field in &ifc.fields {
        let key = if BARE_IDENT.is_match(&field.key) {
            field.key.clone()
        } else {
            format!("'{}'", field.key.replace('\'', "\\'"))
        };
        let opt = if field.optional { "?" } else { "" };
        lines.push(format!("  {key}{opt}: {};", field.ty));
    }
    lines.push("}".to_string());
    lines.join("\n")
}
