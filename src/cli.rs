//! Minimal CLI: infer → (interfaces | shapes)
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer object/array shapes from a JSON document and emit TypeScript-style interface declarations
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and emit interface declarations
    Interfaces(InterfacesOut),
    /// infer and dump the optimized shape graph as JSON (debug view)
    Shapes(ShapesOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// Input document: a literal path, a quoted glob pattern (first match in
    /// sorted order), or a directory (first .json file inside, sorted)
    #[arg(long, short)]
    input: String,

    /// JSON Pointer to select a subnode of the document (e.g. /data/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// jq pre-process filter; the first value it produces becomes the document
    #[arg(long)]
    jq_expr: Option<String>,
}

#[derive(Args, Debug)]
struct InterfacesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// identifier for the top-level interface
    #[arg(long, default_value = "RootObject")]
    root_name: String,

    /// output .ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ShapesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Value> {
        let source_path = resolve_input_path(&self.input)?;
        debug!(path = %source_path.display(), "reading input document");
        let source = std::fs::read_to_string(&source_path)
            .with_context(|| format!("failed to read {}", source_path.display()))?;
        let mut value: Value = crate::path_de::from_str_with_path(&source)
            .with_context(|| format!("failed to parse {}", source_path.display()))?;

        if let Some(pointer) = self.json_pointer.as_ref() {
            value = value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} matched nothing"))?;
        }
        if let Some(expr) = self.jq_expr.as_ref() {
            let mut produced = crate::jq_exec::apply_filter(expr, &value)?;
            if produced.is_empty() {
                bail!("jq filter produced no output");
            }
            value = produced.swap_remove(0);
        }
        Ok(value)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Interfaces(target) => {
                let value = target.input_settings.load()?;
                let graph = crate::infer::build(&value)?;
                debug!(shapes = graph.shapes.len(), "built shape graph");
                let graph = crate::optimize::prune(graph);
                debug!(shapes = graph.shapes.len(), "pruned shape graph");
                let names = crate::naming::assign_names(&graph, &target.root_name)?;
                debug!(interfaces = names.entries.len(), "assigned names");
                let declarations = crate::codegen::declarations(&graph, &names);

                let mut src = declarations.join("\n\n");
                src.push('\n');
                write_output(target.out.as_deref(), &src)
            }
            Command::Shapes(target) => {
                let value = target.input_settings.load()?;
                let graph = crate::optimize::prune(crate::infer::build(&value)?);
                let mut src = serde_json::to_string_pretty(&graph)?;
                src.push('\n');
                write_output(target.out.as_deref(), &src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_input_path(raw: &str) -> Result<PathBuf> {
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    if has_glob_chars(raw) {
        let mut matched: Vec<PathBuf> = glob::glob(raw)?
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("failed to expand glob pattern {raw}"))?;
        matched.sort();
        return matched
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("glob pattern matched no files: {raw}"));
    }

    let path = Path::new(raw);
    if path.is_dir() {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("failed to list {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        candidates.sort();
        return candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no .json file found under {}", path.display()));
    }

    Ok(path.to_path_buf())
}

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}
