pub mod loader;
pub mod merge;
pub mod path;

pub use loader::{PatchDescriptor, load_patch_file};

#[cfg(test)]
mod tests {
    use super::loader::load_patch;
    use crate::document::codec;
    use crate::document::Node;
    use serde_json::{Value, json};

    const JOB: &str = r#"apiVersion: batch/v1
kind: Job
metadata:
  name: test-job
spec:
  template:
    spec:
      containers:
      - name: c
        image: v1
        command: ["echo"]
"#;

    fn patched(patch: &str) -> Value {
        let document = codec::decode("job.yaml", JOB.as_bytes()).unwrap();
        let patch = load_patch("patch", patch.as_bytes()).unwrap();
        let result = patch.apply(&document).unwrap();

        let yaml = codec::to_yaml(&result).unwrap();
        let reread = codec::decode("patched.yaml", yaml.as_bytes()).unwrap();
        Value::from(Node::Mapping(reread.into_root()))
    }

    #[test]
    fn path_patch_sets_image_and_keeps_command() {
        let result = patched(r#"{"path": "spec.template.spec.containers[0].image", "value": "v2"}"#);
        let container = &result["spec"]["template"]["spec"]["containers"][0];

        assert_eq!(container["image"], json!("v2"));
        assert_eq!(container["command"], json!(["echo"]));
    }

    #[test]
    fn merge_patch_matches_containers_by_name() {
        let result = patched(r#"{"spec": {"template": {"spec": {"containers": [{"name": "c", "image": "v2"}]}}}}"#);
        let container = &result["spec"]["template"]["spec"]["containers"][0];

        assert_eq!(container["image"], json!("v2"));
        assert_eq!(container["command"], json!(["echo"]));
    }

    #[test]
    fn failed_patch_surfaces_segment() {
        let document = codec::decode("job.yaml", JOB.as_bytes()).unwrap();
        let patch = load_patch("patch", br#"{"path": "spec.template.spec.containers[5].image", "value": "x"}"#).unwrap();

        let err = patch.apply(&document).unwrap_err();
        assert_eq!(err.to_string(), "array index out of bounds: containers[5] (length 1)");
    }
}
