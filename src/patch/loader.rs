use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::path::PathExpr;
use crate::document::codec::decode_node;
use crate::document::{Document, Mapping, Node, Scalar};
use crate::error::{Error, Result};

/// What a patch file asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchDescriptor {
    /// Set `value` at `path`, replacing whatever was there.
    Path { path: PathExpr, value: Node },
    /// Merge a partial document into the job.
    Merge(Mapping),
}

impl PatchDescriptor {
    pub fn apply(&self, document: &Document) -> Result<Document> {
        match self {
            PatchDescriptor::Path { path, value } => document.with_value_at(path, value.clone()),
            PatchDescriptor::Merge(fragment) => Ok(document.merged_with(fragment)),
        }
    }
}

/// Decode a patch from JSON or YAML bytes.
///
/// A mapping holding a non-empty string `path` and a `value` is a path patch,
/// any other mapping is a merge fragment.
pub fn load_patch(source_name: &str, bytes: &[u8]) -> Result<PatchDescriptor> {
    let node = decode_node(bytes).map_err(|reason| Error::malformed_patch(source_name, reason))?;
    let Node::Mapping(fields) = node else {
        return Err(Error::malformed_patch(
            source_name,
            "expected a mapping at the top level",
        ));
    };

    let path_patch = match (fields.get("path"), fields.get("value")) {
        (Some(Node::Scalar(Scalar::String(raw))), Some(value))
            if !raw.is_empty() =>
        {
            Some((raw.clone(), value.clone()))
        }
        _ => None,
    };

    match path_patch {
        Some((raw, value)) => {
            let path = raw.parse::<PathExpr>()?;
            debug!(%path, "loaded path patch from {source_name}");
            Ok(PatchDescriptor::Path { path, value })
        }
        None => {
            if fields.contains_key("path") {
                warn!(
                    "{source_name} has a `path` key but no usable path patch, merging it into the job as is"
                );
            }
            debug!(keys = fields.len(), "loaded merge patch from {source_name}");
            Ok(PatchDescriptor::Merge(fields))
        }
    }
}

pub fn load_patch_file(path: &Path) -> Result<PatchDescriptor> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    load_patch(&path.display().to_string(), &bytes)
}
