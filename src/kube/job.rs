use anyhow::{Result, anyhow};
use k8s_openapi::api::batch::v1::{Job, JobTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use rand::Rng;

use super::template::TemplateSpecOps;

const SUFFIX_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;
const INSTANTIATE_ANNOTATION: &str = "cronjob.kubernetes.io/instantiate";

/// Everything a manual job needs from its cronjob.
#[derive(Debug, Clone)]
pub struct CronJobTemplate {
    pub name: String,
    pub owner_reference: OwnerReference,
    pub template: JobTemplateSpec,
}

impl CronJobTemplate {
    pub fn from_cronjob<T: TemplateSpecOps>(cronjob: T) -> Result<Self> {
        let owner_reference = cronjob.owner_reference()?;
        Ok(Self {
            name: owner_reference.name.clone(),
            owner_reference,
            template: cronjob.get_template_spec()?,
        })
    }
}

pub fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_LETTERS[rng.random_range(0..SUFFIX_LETTERS.len())] as char)
        .collect()
}

/// Build a manual job from the cronjob job template
///
/// # Arguments
///
/// * `namespace` - namespace the job is created in
/// * `cronjob` - CronJobTemplate
/// * `suffix` - appended to the cronjob name to form the job name
pub fn build_manual_job(namespace: &str, cronjob: CronJobTemplate, suffix: &str) -> Result<Job> {
    let CronJobTemplate {
        name,
        owner_reference,
        template,
    } = cronjob;

    let spec = template
        .spec
        .ok_or_else(|| anyhow!("Unable to get the job template spec of the cronjob {name:?}"))?;
    let template_meta = template.metadata.unwrap_or_default();

    let mut annotations = template_meta.annotations.unwrap_or_default();
    annotations.insert(INSTANTIATE_ANNOTATION.to_owned(), "manual".to_owned());

    Ok(Job {
        metadata: ObjectMeta {
            name: Some(format!("{name}-{suffix}")),
            namespace: Some(namespace.to_owned()),
            labels: template_meta.labels,
            annotations: Some(annotations),
            owner_references: Some(vec![owner_reference]),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::batch::v1::CronJob;
    use serde_json::json;

    fn cronjob() -> CronJob {
        serde_json::from_value(json!({
            "apiVersion": "batch/v1",
            "kind": "CronJob",
            "metadata": {"name": "report", "namespace": "ops", "uid": "4f3e2d1c-0b9a-4887-a665-544332211000"},
            "spec": {
                "schedule": "@hourly",
                "jobTemplate": {
                    "metadata": {
                        "labels": {"app": "report"},
                        "annotations": {"team": "data"}
                    },
                    "spec": {"backoffLimit": 3, "template": {"spec": {
                        "restartPolicy": "Never",
                        "containers": [{"name": "report", "image": "report:1.2"}]
                    }}}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn suffix_is_lowercase_alphanumeric() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.bytes().all(|b| SUFFIX_LETTERS.contains(&b)));
    }

    #[test]
    fn manual_job_carries_template_and_owner() {
        let template = CronJobTemplate::from_cronjob(cronjob()).unwrap();
        let job = build_manual_job("ops", template, "a1b2c3").unwrap();

        assert_eq!(job.metadata.name.as_deref(), Some("report-a1b2c3"));
        assert_eq!(job.metadata.namespace.as_deref(), Some("ops"));
        assert_eq!(job.metadata.labels.unwrap()["app"], "report");

        let annotations = job.metadata.annotations.unwrap();
        assert_eq!(annotations["team"], "data");
        assert_eq!(annotations[INSTANTIATE_ANNOTATION], "manual");

        let owners = job.metadata.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].name, "report");
        assert_eq!(owners[0].kind, "CronJob");

        assert_eq!(job.spec.unwrap().backoff_limit, Some(3));
    }

    #[test]
    fn template_without_spec_is_an_error() {
        let mut template = CronJobTemplate::from_cronjob(cronjob()).unwrap();
        template.template.spec = None;

        let err = build_manual_job("ops", template, "a1b2c3").unwrap_err();
        assert!(err.to_string().contains("report"));
    }
}
