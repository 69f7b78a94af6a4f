//! Name assignment over the pruned shape graph.
//!
//! Depth-first, children before parents, so a child's name is always
//! available when its parent's fields are rendered. Object shapes receive
//! unique PascalCase identifiers derived from the field key that led to
//! them; array shapes only get memoized inline type expressions. All state
//! lives in an explicit context so runs are isolated.

use std::collections::{HashMap, HashSet};

use crate::error::{ShapeError, ShapeResult};
use crate::shape::{Digest, Primitive, Shape, ShapeId, TypeGraph};

/// Collision suffixes tried after the bare name; past this, assignment fails.
const NAME_SUFFIX_LIMIT: usize = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct NameEntry {
    pub id: Digest,
    pub name: String,
    /// Set on exactly one entry: the top-level named shape, which carries the
    /// configured root name and the export qualifier.
    pub root: bool,
}

/// Output of name assignment: root-first entries plus the lookup tables the
/// synthesizer resolves field types against.
#[derive(Clone, Debug)]
pub struct NameTable {
    pub entries: Vec<NameEntry>,
    names: HashMap<Digest, String>,
    array_exprs: HashMap<Digest, String>,
}

impl NameTable {
    /// Display string for any id: primitive token, assigned object name, or
    /// memoized array type expression.
    pub fn display(&self, id: &ShapeId) -> &str {
        match id {
            ShapeId::Primitive(p) => p.token(),
            ShapeId::Digest(digest) => self
                .names
                .get(digest)
                .or_else(|| self.array_exprs.get(digest))
                .map(String::as_str)
                .unwrap_or_else(|| panic!("naming invariant broken: unresolved shape {digest}")),
        }
    }
}

pub fn assign_names(graph: &TypeGraph, root_name: &str) -> ShapeResult<NameTable> {
    let mut ctx = NamingContext {
        graph,
        used: HashSet::new(),
        names: HashMap::new(),
        array_exprs: HashMap::new(),
        entries: Vec::new(),
    };
    ctx.visit(&graph.root, root_name, false)?;

    // assignment is children-first; declarations want root-first
    ctx.entries.reverse();
    if let Some(first) = ctx.entries.first_mut() {
        first.root = true;
    }

    Ok(NameTable {
        entries: ctx.entries,
        names: ctx.names,
        array_exprs: ctx.array_exprs,
    })
}

struct NamingContext<'a> {
    graph: &'a TypeGraph,
    used: HashSet<String>,
    names: HashMap<Digest, String>,
    array_exprs: HashMap<Digest, String>,
    entries: Vec<NameEntry>,
}

impl NamingContext<'_> {
    /// Resolve `id` to its display string, naming any not-yet-visited object
    /// shapes along the way. `key` is the field key that led here; `element`
    /// marks ids reached as array elements (their keys get singularized).
    fn visit(&mut self, id: &ShapeId, key: &str, element: bool) -> ShapeResult<String> {
        let digest = match id {
            ShapeId::Primitive(p) => return Ok(p.token().to_string()),
            ShapeId::Digest(digest) => digest.clone(),
        };
        if let Some(name) = self.names.get(&digest) {
            return Ok(name.clone());
        }
        if let Some(expr) = self.array_exprs.get(&digest) {
            return Ok(expr.clone());
        }

        match self.graph.expect_shape(&digest).clone() {
            Shape::Array(arr) => {
                // position-qualify keys only for true unions, where two
                // distinct element shapes under one key would collide
                let qualify = arr.is_union();
                let mut members = Vec::with_capacity(arr.elems.len());
                for (index, elem) in arr.elems.iter().enumerate() {
                    let elem_key = if qualify { format!("{key}{index}") } else { key.to_string() };
                    members.push(self.visit(elem, &elem_key, true)?);
                }
                let expr = array_expr(&members);
                self.array_exprs.insert(digest, expr.clone());
                Ok(expr)
            }
            Shape::Object(obj) => {
                for field in &obj.fields {
                    for ty in &field.types {
                        self.visit(ty, &field.name, false)?;
                    }
                }
                let name = self.claim(key, element)?;
                self.names.insert(digest.clone(), name.clone());
                self.entries.push(NameEntry { id: digest, name: name.clone(), root: false });
                Ok(name)
            }
        }
    }

    /// Bare name first, then the smallest unused suffix starting at 2.
    fn claim(&mut self, key: &str, element: bool) -> ShapeResult<String> {
        let base = identifier_for(key, element);
        if self.used.insert(base.clone()) {
            return Ok(base);
        }
        for n in 2..=NAME_SUFFIX_LIMIT {
            let candidate = format!("{base}{n}");
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(ShapeError::NameSpaceExhausted { base, limit: NAME_SUFFIX_LIMIT })
    }
}

fn array_expr(members: &[String]) -> String {
    match members {
        [] => Primitive::Any.token().to_string(),
        [member] if is_top_level_union(member) => format!("({member})[]"),
        [member] => format!("{member}[]"),
        _ => members.join(" | "),
    }
}

/// A `|` outside parentheses. `(number | string)[]` is an array of a union,
/// not a union.
pub(crate) fn is_top_level_union(expr: &str) -> bool {
    let mut depth = 0usize;
    for c in expr.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

pub(crate) fn split_top_level_union(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(expr[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(expr[start..].trim());
    parts
}

fn identifier_for(key: &str, element: bool) -> String {
    let key = if element { singularize(key) } else { key.to_string() };
    sanitize(&pascal_case(&key))
}

/// Heuristic pluralization reversal for array-element keys ("users" → "user").
fn singularize(key: &str) -> String {
    if let Some(stem) = key.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = key.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    for suffix in ["ches", "shes", "xes", "zes"] {
        if let Some(stem) = key.strip_suffix(suffix) {
            if !stem.is_empty() {
                return format!("{stem}{}", &suffix[..suffix.len() - 2]);
            }
        }
    }
    if key.len() > 1 && key.ends_with('s') && !key.ends_with("ss") && !key.ends_with("us") && !key.ends_with("is") {
        return key[..key.len() - 1].to_string();
    }
    key.to_string()
}

/// Split on whitespace, capitalize each segment.
fn pascal_case(key: &str) -> String {
    key.split_whitespace()
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Strip characters invalid in a bare identifier; prefix an underscore when
/// the result no longer starts with a letter.
fn sanitize(name: &str) -> String {
    let kept: String = name.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    match kept.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => kept,
        _ => format!("_{kept}"),
    }
}
