//! Structural merge of a partial document into a job document.
//!
//! Mappings merge recursively, `null` removes a key, and any other value in
//! the fragment replaces the target. Sequences replace the target as a whole
//! unless the field has a conventional merge key, in which case elements are
//! matched by that key the way Kubernetes merges container lists by name.

use crate::document::{Document, Mapping, Node};

const MERGE_KEYS: &[(&str, &str)] = &[
    ("containers", "name"),
    ("initContainers", "name"),
    ("ephemeralContainers", "name"),
    ("env", "name"),
    ("volumes", "name"),
    ("imagePullSecrets", "name"),
    ("volumeMounts", "mountPath"),
    ("ports", "containerPort"),
    ("hostAliases", "ip"),
];

fn merge_key(field: &str) -> Option<&'static str> {
    MERGE_KEYS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, key)| *key)
}

impl Document {
    /// Return a copy of the document with `fragment` merged into it.
    pub fn merged_with(&self, fragment: &Mapping) -> Document {
        let mut merged = self.root().clone();
        merge_mapping(&mut merged, fragment);
        Document::new(merged)
    }
}

fn merge_mapping(target: &mut Mapping, fragment: &Mapping) {
    for (key, patch) in fragment {
        if patch.is_null() {
            target.shift_remove(key);
            continue;
        }

        match target.get_mut(key) {
            Some(existing) => merge_field(key, existing, patch),
            None => {
                // merging into an empty mapping drops nested nulls
                let mut fresh = Node::Mapping(Mapping::new());
                merge_field(key, &mut fresh, patch);
                target.insert(key.clone(), fresh);
            }
        }
    }
}

fn merge_field(field: &str, target: &mut Node, patch: &Node) {
    match (target, patch) {
        (Node::Mapping(target), Node::Mapping(patch)) => merge_mapping(target, patch),
        (Node::Sequence(target), Node::Sequence(patch)) => match merge_key(field) {
            Some(key) if keyed_by(target, key) && keyed_by(patch, key) => {
                merge_keyed(target, patch, key)
            }
            _ => *target = patch.clone(),
        },
        (slot, patch) => *slot = patch.clone(),
    }
}

fn keyed_by(items: &[Node], key: &str) -> bool {
    items.iter().all(|item| {
        item.as_mapping()
            .and_then(|fields| fields.get(key))
            .is_some_and(|id| !id.is_null())
    })
}

fn merge_keyed(target: &mut Vec<Node>, patch: &[Node], key: &str) {
    for element in patch {
        let Node::Mapping(fields) = element else {
            continue;
        };
        let id = fields.get(key);

        let existing = target.iter_mut().find_map(|item| match item {
            Node::Mapping(existing) if existing.get(key) == id => Some(existing),
            _ => None,
        });

        match existing {
            Some(existing) => merge_mapping(existing, fields),
            None => {
                let mut fresh = Node::Mapping(Mapping::new());
                merge_field(key, &mut fresh, element);
                target.push(fresh);
            }
        }
    }
}
