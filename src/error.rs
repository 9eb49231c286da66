use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, patching and encoding a job document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path segment is not an object: {segment}")]
    PathSegmentTypeMismatch { segment: String },

    #[error("invalid array index in path: {segment}")]
    InvalidArrayIndex { segment: String },

    #[error("array index out of bounds: {segment} (length {len})")]
    ArrayIndexOutOfBounds { segment: String, len: usize },

    #[error("invalid patch path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("malformed patch file {source_name}: {reason}")]
    MalformedPatchFile { source_name: String, reason: String },

    #[error("unable to decode {source_name}: {reason}")]
    CodecDecodeFailure { source_name: String, reason: String },

    #[error("unable to encode job document: {0}")]
    CodecEncodeFailure(String),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn type_mismatch(segment: impl Into<String>) -> Self {
        Error::PathSegmentTypeMismatch {
            segment: segment.into(),
        }
    }

    pub fn decode(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::CodecDecodeFailure {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed_patch(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::MalformedPatchFile {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
