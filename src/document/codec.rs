//! Conversion between typed workloads, job documents and their YAML/JSON encodings.
//!
//! Owner references are rendered as a commented block right under the
//! `namespace:` line of the metadata section so that an edited manifest can
//! be applied without re-attaching the job to its cronjob.

use std::path::Path;

use k8s_openapi::api::batch::v1::Job;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use super::{Document, Mapping, Node};
use crate::error::{Error, Result};

const OWNER_REFERENCES_COMMENT: &str = "  # ";

/// Encoding of a manifest file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Convert any serializable resource into its document tree. Keys keep the
/// order in which the typed schema serializes its fields.
pub fn to_tree<T: Serialize>(resource: &T) -> Result<Document> {
    let value = serde_json::to_value(resource).map_err(|e| Error::CodecEncodeFailure(e.to_string()))?;
    match Node::from(value) {
        Node::Mapping(root) => Ok(Document::new(root)),
        _ => Err(Error::CodecEncodeFailure(
            "resource does not serialize to a mapping".to_owned(),
        )),
    }
}

pub fn from_tree<T: DeserializeOwned>(source_name: &str, document: Document) -> Result<T> {
    let value = Value::from(Node::Mapping(document.into_root()));
    serde_json::from_value(value).map_err(|e| Error::decode(source_name, e))
}

pub fn to_yaml(document: &Document) -> Result<String> {
    let yaml = serde_yml::to_string(document).map_err(|e| Error::CodecEncodeFailure(e.to_string()))?;
    Ok(match yaml.strip_prefix("---\n") {
        Some(body) => body.to_owned(),
        None => yaml,
    })
}

pub fn to_json(document: &Document) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(|e| Error::CodecEncodeFailure(e.to_string()))
}

/// Decode a JSON or YAML payload into a node.
///
/// JSON is attempted first so that tab-indented JSON files, which YAML
/// rejects, still load.
pub(crate) fn decode_node(bytes: &[u8]) -> std::result::Result<Node, String> {
    let json_err = match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => return Ok(Node::from(value)),
        Err(err) => err,
    };

    let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
    match serde_yml::from_str::<Value>(text) {
        Ok(value) => Ok(Node::from(value)),
        Err(_) if looks_like_json(text) => Err(json_err.to_string()),
        Err(yaml_err) => Err(yaml_err.to_string()),
    }
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{' | '['))
}

/// Decode a JSON or YAML encoded document. The top level must be a mapping.
pub fn decode(source_name: &str, bytes: &[u8]) -> Result<Document> {
    match decode_node(bytes).map_err(|reason| Error::decode(source_name, reason))? {
        Node::Mapping(root) => Ok(Document::new(root)),
        _ => Err(Error::decode(source_name, "expected a mapping at the top level")),
    }
}

pub fn decode_job(source_name: &str, bytes: &[u8]) -> Result<Job> {
    let document = decode(source_name, bytes)?;
    from_tree(source_name, document)
}

/// Render the job with its owner references commented out.
pub fn job_to_manifest(format: Format, job: &Job) -> Result<String> {
    let mut document = to_tree(job)?;
    let owner_references = document.take_owner_references();
    render_manifest(format, &document, owner_references.as_ref())
}

/// Encode `document` and, for YAML, splice the commented `owner_references`
/// block into its metadata section. JSON has no comments, so the owner
/// references are left out.
pub fn render_manifest(
    format: Format,
    document: &Document,
    owner_references: Option<&Node>,
) -> Result<String> {
    if format == Format::Json {
        if owner_references.is_some() {
            debug!("owner references are not rendered in json manifests");
        }
        return to_json(document);
    }

    let body = to_yaml(document)?;
    let Some(refs) = owner_references else {
        return Ok(body);
    };

    let mut wrapper = Mapping::new();
    wrapper.insert("ownerReferences".to_owned(), refs.clone());
    let refs_yaml = to_yaml(&Document::new(wrapper))?;

    let block: String = refs_yaml
        .lines()
        .map(|line| format!("{OWNER_REFERENCES_COMMENT}{line}\n"))
        .collect();

    Ok(splice_after_anchor(&body, &block))
}

fn splice_after_anchor(yaml: &str, block: &str) -> String {
    let lines: Vec<&str> = yaml.split_inclusive('\n').collect();
    let mut out = String::with_capacity(yaml.len() + block.len() + 1);

    let Some(anchor) = metadata_anchor(&lines) else {
        out.push_str(yaml);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(block);
        return out;
    };

    for (idx, line) in lines.iter().enumerate() {
        out.push_str(line);
        if idx == anchor {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(block);
        }
    }
    out
}

/// Index of the line the owner references are placed after: the metadata
/// `namespace:` line, then the `name:` line, then `metadata:` itself.
fn metadata_anchor(lines: &[&str]) -> Option<usize> {
    let start = lines
        .iter()
        .position(|line| line.starts_with("metadata:"))?;

    let body_len = lines[start + 1..]
        .iter()
        .position(|line| !line.starts_with(' ') && !line.trim().is_empty())
        .unwrap_or(lines.len() - start - 1);
    let body = &lines[start + 1..start + 1 + body_len];

    let field = |key: &str| {
        body.iter()
            .position(|line| {
                line.strip_prefix("  ")
                    .is_some_and(|rest| rest.starts_with(key))
            })
            .map(|pos| start + 1 + pos)
    };

    field("namespace:").or_else(|| field("name:")).or(Some(start))
}
