/// Errors raised when the input tree violates the pandoc AST contract.
///
/// Malformed *annotations* in caption text are never errors: the attribute
/// grammar simply fails to match and the caption passes through untouched.
/// These variants cover structurally invalid input, which indicates a broken
/// caller, not ambiguous user content.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed table payload: {0}")]
    MalformedTable(String),

    #[error("malformed inline element: {0}")]
    MalformedInline(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
