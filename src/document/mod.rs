use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

pub mod codec;

/// String keyed map that keeps the order keys were inserted in.
pub type Mapping = IndexMap<String, Node>;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A node of a job document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

impl Node {
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(fields) => Node::Mapping(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n),
            Node::Scalar(Scalar::String(s)) => Value::String(s),
            Node::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Mapping(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, node)| (key, Value::from(node)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Scalar::String(s.to_owned()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Scalar::String(s))
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Node::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Node::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            Node::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Mapping(fields) => serializer.collect_map(fields),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

/// The generic tree form of a workload manifest. The root is always a mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Mapping,
}

impl Document {
    pub fn new(root: Mapping) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    pub fn into_root(self) -> Mapping {
        self.root
    }

    /// Remove `metadata.ownerReferences` from the document.
    ///
    /// Returns `None` when there were no owner references to remove.
    pub fn take_owner_references(&mut self) -> Option<Node> {
        let metadata = self.root.get_mut("metadata")?.as_mapping_mut()?;
        match metadata.shift_remove("ownerReferences")? {
            Node::Sequence(items) if items.is_empty() => None,
            refs if refs.is_null() => None,
            refs => Some(refs),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Document {
        match Node::from(value) {
            Node::Mapping(root) => Document::new(root),
            other => panic!("expected a mapping, got {other:?}"),
        }
    }

    #[test]
    fn conversion_keeps_key_order() {
        let value = json!({"kind": "Job", "apiVersion": "batch/v1", "metadata": {"name": "a"}});
        let node = Node::from(value.clone());

        let keys: Vec<_> = node.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["kind", "apiVersion", "metadata"]);
        assert_eq!(Value::from(node), value);
    }

    #[test]
    fn take_owner_references_removes_the_list() {
        let mut doc = document(json!({
            "metadata": {
                "name": "job",
                "namespace": "ns",
                "ownerReferences": [{"kind": "CronJob", "name": "job"}]
            }
        }));

        let refs = doc.take_owner_references().unwrap();
        assert_eq!(refs.as_sequence().unwrap().len(), 1);
        assert_eq!(
            Value::from(Node::Mapping(doc.into_root())),
            json!({"metadata": {"name": "job", "namespace": "ns"}})
        );
    }

    #[test]
    fn take_owner_references_ignores_empty_list() {
        let mut doc = document(json!({"metadata": {"name": "job", "ownerReferences": []}}));

        assert!(doc.take_owner_references().is_none());
        assert!(!doc.root()["metadata"].as_mapping().unwrap().contains_key("ownerReferences"));
    }

    #[test]
    fn take_owner_references_without_metadata() {
        let mut doc = document(json!({"spec": {}}));
        assert!(doc.take_owner_references().is_none());
    }
}
