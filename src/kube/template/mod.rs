use anyhow::{Result, anyhow};
use k8s_openapi::api::batch::v1::JobTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

pub mod cronjob;
pub mod legacy;

pub trait TemplateSpecOps {
    /// apiVersion the object was read with
    fn owner_api_version(&self) -> &str;

    fn object_meta(&self) -> &ObjectMeta;

    /// Get the job template spec of the cronjob
    fn get_template_spec(self) -> Result<JobTemplateSpec>;

    /// Reference pointing back at the cronjob, blocking its deletion while the job exists
    fn owner_reference(&self) -> Result<OwnerReference> {
        let meta = self.object_meta();
        let name = meta
            .name
            .clone()
            .ok_or_else(|| anyhow!("Unable to find the name of the cronjob"))?;
        let uid = meta
            .uid
            .clone()
            .ok_or_else(|| anyhow!("Unable to find the uid of the cronjob {name:?}"))?;

        Ok(OwnerReference {
            api_version: self.owner_api_version().to_owned(),
            kind: "CronJob".to_owned(),
            name,
            uid,
            block_owner_deletion: Some(true),
            controller: None,
        })
    }
}
