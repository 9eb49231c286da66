//! Path expressions such as `spec.template.spec.containers[0].image` and
//! the resolver that sets a value at such a path.
//!
//! Missing intermediate keys are created as empty mappings, so a patch may
//! introduce new nested structure. Array indices are never created: they must
//! address an existing element of an existing sequence.

use std::fmt;
use std::str::FromStr;

use crate::document::{Document, Mapping, Node};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index { name: String, index: usize },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index { name, index } => write!(f, "{name}[{index}]"),
        }
    }
}

/// A parsed, non-empty path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathExpr {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidPath {
                path: path.to_owned(),
                reason: "path is empty",
            });
        }

        let segments = path
            .split('.')
            .map(|raw| parse_segment(path, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: path.to_owned(),
            segments,
        })
    }
}

fn parse_segment(path: &str, raw: &str) -> Result<Segment> {
    if raw.is_empty() {
        return Err(Error::InvalidPath {
            path: path.to_owned(),
            reason: "path contains an empty segment",
        });
    }

    let invalid_index = || Error::InvalidArrayIndex {
        segment: raw.to_owned(),
    };

    let Some(open) = raw.find('[') else {
        if raw.contains(']') {
            return Err(invalid_index());
        }
        return Ok(Segment::Key(raw.to_owned()));
    };

    let name = &raw[..open];
    if name.is_empty() {
        return Err(Error::InvalidPath {
            path: path.to_owned(),
            reason: "array index without a field name",
        });
    }

    let digits = raw[open + 1..]
        .strip_suffix(']')
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(invalid_index)?;
    // An index too large for usize is never in bounds.
    let index = digits.parse::<usize>().unwrap_or(usize::MAX);

    Ok(Segment::Index {
        name: name.to_owned(),
        index,
    })
}

impl Document {
    /// Return a copy of the document with `value` set at `path`.
    ///
    /// A plain terminal segment replaces the key wholesale, an indexed one
    /// replaces the addressed element. `self` is never modified, so a failed
    /// patch leaves the original document intact.
    pub fn with_value_at(&self, path: &PathExpr, value: Node) -> Result<Document> {
        let mut patched = self.clone();
        set_at(patched.root_mut(), path.segments(), value)?;
        Ok(patched)
    }

    pub fn lookup(&self, path: &PathExpr) -> Option<&Node> {
        let mut node: Option<&Node> = None;
        for segment in path.segments() {
            let fields = match node {
                None => self.root(),
                Some(parent) => parent.as_mapping()?,
            };
            node = Some(match segment {
                Segment::Key(key) => fields.get(key)?,
                Segment::Index { name, index } => fields.get(name)?.as_sequence()?.get(*index)?,
            });
        }
        node
    }
}

fn set_at(root: &mut Mapping, segments: &[Segment], value: Node) -> Result<()> {
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        current = descend(current, segment)?;
    }

    match last {
        Segment::Key(key) => {
            current.insert(key.clone(), value);
        }
        Segment::Index { name, index } => {
            *element_mut(current, name, *index)? = value;
        }
    }
    Ok(())
}

fn descend<'a>(current: &'a mut Mapping, segment: &Segment) -> Result<&'a mut Mapping> {
    let node = match segment {
        Segment::Key(key) => current
            .entry(key.clone())
            .or_insert_with(|| Node::Mapping(Mapping::new())),
        Segment::Index { name, index } => element_mut(current, name, *index)?,
    };
    node.as_mapping_mut()
        .ok_or_else(|| Error::type_mismatch(segment.to_string()))
}

fn element_mut<'a>(current: &'a mut Mapping, name: &str, index: usize) -> Result<&'a mut Node> {
    let items = current
        .get_mut(name)
        .and_then(Node::as_sequence_mut)
        .ok_or_else(|| Error::type_mismatch(name))?;

    let len = items.len();
    items
        .get_mut(index)
        .ok_or_else(|| Error::ArrayIndexOutOfBounds {
            segment: format!("{name}[{index}]"),
            len,
        })
}
