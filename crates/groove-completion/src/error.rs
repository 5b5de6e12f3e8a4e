use std::path::PathBuf;

/// Errors from the fallible edges of the engine: loading configuration and
/// class indexes, and validating requests.
///
/// Failures inside a completion request (an unparseable position, a symbol
/// that does not resolve, a cancelled enumeration) are not errors: they
/// shrink the result list and are logged.
#[derive(Debug, thiserror::Error)]
pub enum GrooveError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid class index: {0}")]
    Index(#[from] serde_json::Error),

    #[error("offset {offset} is outside the document (length {len})")]
    OffsetOutOfBounds { offset: u32, len: u32 },

    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(u32),
}

impl GrooveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrooveError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Check that `offset` is a valid cursor position in `text`.
pub fn check_offset(text: &str, offset: u32) -> Result<(), GrooveError> {
    let len = text.len() as u32;
    if offset > len {
        return Err(GrooveError::OffsetOutOfBounds { offset, len });
    }
    if !text.is_char_boundary(offset as usize) {
        return Err(GrooveError::NotCharBoundary(offset));
    }
    Ok(())
}
