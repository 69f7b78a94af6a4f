use thiserror::Error;

/// Errors surfaced by the inference pipeline. All of them are terminal for
/// the current document; no partial output is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("unsupported root shape: expected an object or a non-empty array of objects, found {0}")]
    UnsupportedRoot(&'static str),

    #[error("identifier space exhausted for '{base}': every suffix up to {limit} is taken")]
    NameSpaceExhausted { base: String, limit: usize },
}

pub type ShapeResult<T> = Result<T, ShapeError>;
