use anyhow::{Result, anyhow};
use k8s_openapi::Resource;
use k8s_openapi::api::batch::v1::{CronJob, JobTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::TemplateSpecOps;

impl TemplateSpecOps for CronJob {
    fn owner_api_version(&self) -> &str {
        <CronJob as Resource>::API_VERSION
    }

    fn object_meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn get_template_spec(self) -> Result<JobTemplateSpec> {
        self.spec.map(|spec| spec.job_template).ok_or_else(|| {
            anyhow!(
                "Unable to found the cronjob spec for the cronjob {:?}",
                self.metadata.name.unwrap_or_default()
            )
        })
    }
}
