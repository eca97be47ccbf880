use std::path::PathBuf;

use crate::error::{AppError, AppResult, ConfigError};

/// Resolves the `--body` argument into the in-memory request body.
///
/// A value starting with `@` names a file whose contents become the body;
/// anything else is used literally. An empty value means no body.
///
/// # Errors
///
/// Returns an error when the referenced body file cannot be read.
pub fn resolve_body(value: &str) -> AppResult<Option<Vec<u8>>> {
    let bytes = match value.strip_prefix('@') {
        Some(path) => {
            let path = PathBuf::from(path);
            std::fs::read(&path).map_err(|err| {
                AppError::config(ConfigError::ReadBody {
                    path: path.clone(),
                    source: err,
                })
            })?
        }
        None => value.as_bytes().to_vec(),
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(bytes))
}
