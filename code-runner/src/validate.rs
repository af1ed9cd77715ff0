use std::ffi::OsStr;
use std::path::Path;

use tracing::error;

use crate::{
    error::Error,
    types::{ExecutionRequest, RunRequest, DEFAULT_LANGUAGE},
};

/// Validate a raw request before anything touches the filesystem.
///
/// A request is either fully valid or rejected here; in particular the
/// traversal check runs before any scratch file is written.
pub fn validate(raw: RunRequest) -> Result<ExecutionRequest, Error> {
    let code = raw.code.filter(|c| !c.is_empty());
    let filename = raw.filename.filter(|f| !f.is_empty());

    let (code, filename) = match (code, filename) {
        (Some(code), Some(filename)) => (code, filename),
        _ => {
            error!("Missing 'code' or 'filename' in request");
            return Err(Error::MissingField);
        }
    };

    if is_traversal(&filename) {
        error!(filename = %filename, "Directory traversal attempt detected");
        return Err(Error::PathTraversal);
    }

    let language = raw
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    Ok(ExecutionRequest {
        code,
        filename,
        language,
    })
}

/// A filename is rejected when reducing it to its final path component changes
/// it, or when it contains a literal `..` anywhere.
fn is_traversal(filename: &str) -> bool {
    filename.contains("..") || Path::new(filename).file_name() != Some(OsStr::new(filename))
}
