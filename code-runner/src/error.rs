use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid JSON payload")]
    MalformedInput,

    #[error("Missing 'code' or 'filename'")]
    MissingField,

    #[error("Invalid filename. Directory traversal attempt detected.")]
    PathTraversal,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to write code to file: {0}")]
    WriteFailure(String),
}
