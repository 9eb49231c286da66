//! `batch/v1beta1` CronJobs, served by clusters older than 1.21 and read
//! through the dynamic API.

use anyhow::{Context, Result, anyhow};
use k8s_openapi::api::batch::v1::JobTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;

use super::TemplateSpecOps;

pub const LEGACY_API_VERSION: &str = "batch/v1beta1";

pub fn legacy_cronjob_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk("batch", "v1beta1", "CronJob"))
}

impl TemplateSpecOps for DynamicObject {
    fn owner_api_version(&self) -> &str {
        LEGACY_API_VERSION
    }

    fn object_meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn get_template_spec(self) -> Result<JobTemplateSpec> {
        let name = self.metadata.name.unwrap_or_default();
        let template = self
            .data
            .get("spec")
            .and_then(|spec| spec.get("jobTemplate"))
            .cloned()
            .ok_or_else(|| anyhow!("Unable to found the cronjob spec for the cronjob {name:?}"))?;

        serde_json::from_value(template)
            .with_context(|| format!("Unable to decode the job template of the cronjob {name:?}"))
    }
}
