use std::path::Path;

use anyhow::{Context, Result};
use colored::{self, Colorize};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use kube::{
    Client,
    api::{Api, DynamicObject, ListParams},
    config::{Config, KubeConfigOptions, Kubeconfig},
};
use spinners::{Spinner, Spinners};
use tracing::{debug, info};

pub(crate) mod job;
pub(crate) mod template;
pub(crate) mod version;

use job::CronJobTemplate;
use template::legacy::legacy_cronjob_resource;

pub struct KubeHandler {
    client: Client,
    namespace: String,
}

impl KubeHandler {
    /// Create a new instance of the KubeHandler
    ///
    /// # Arguments
    ///
    /// * `kubeconfig` - explicit kubeconfig, kube's inference chain is used otherwise
    /// * `namespace` - falls back to the namespace of the current kubeconfig context
    pub async fn new(kubeconfig: Option<&Path>, namespace: Option<String>) -> Result<Self> {
        let client = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await?;
                Client::try_from(config)?
            }
            None => Client::try_default().await?,
        };

        let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_owned());
        debug!(%namespace, "connected to kubernetes");

        Ok(Self { client, namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn cronjob_ga(&self) -> Result<bool> {
        let info = self
            .client
            .apiserver_version()
            .await
            .context("failed to get server version")?;
        let ga = version::is_cronjob_ga(&info.major, &info.minor);
        debug!(major = %info.major, minor = %info.minor, ga, "detected server version");
        Ok(ga)
    }

    /// Get the job template of the targeted cronjob, reading it with the
    /// api version the server supports
    ///
    /// # Arguments
    ///
    /// * `name` - N
    pub async fn get_cronjob_template<N: AsRef<str>>(&self, name: N) -> Result<CronJobTemplate> {
        println!(
            "Getting cronjob {} from namespace {}",
            name.as_ref().truecolor(7, 174, 237).bold(),
            self.namespace.truecolor(133, 59, 255).bold()
        );

        let mut spinner = Spinner::new(Spinners::Dots, "Fetching cronjob".to_owned());
        let template = self.fetch_cronjob_template(name.as_ref()).await;
        spinner.stop_with_newline();
        template
    }

    async fn fetch_cronjob_template(&self, name: &str) -> Result<CronJobTemplate> {
        if self.cronjob_ga().await? {
            let cronjobs: Api<CronJob> = Api::namespaced(self.client.clone(), &self.namespace);
            let cronjob = cronjobs
                .get(name)
                .await
                .with_context(|| format!("failed to get cronjob {name:?}"))?;
            return CronJobTemplate::from_cronjob(cronjob);
        }

        info!("server predates batch/v1 cronjobs, using batch/v1beta1");
        let cronjobs: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            &self.namespace,
            &legacy_cronjob_resource(),
        );
        let cronjob = cronjobs
            .get(name)
            .await
            .with_context(|| format!("failed to get cronjob {name:?}"))?;
        CronJobTemplate::from_cronjob(cronjob)
    }

    /// List cronjob available in the selected namespace
    pub async fn list_cronjob(&self) -> Result<Vec<String>> {
        let lp = ListParams::default();

        let names = if self.cronjob_ga().await? {
            let cronjobs: Api<CronJob> = Api::namespaced(self.client.clone(), &self.namespace);
            cronjobs
                .list(&lp)
                .await?
                .items
                .into_iter()
                .filter_map(|item| item.metadata.name)
                .collect::<Vec<_>>()
        } else {
            let cronjobs: Api<DynamicObject> = Api::namespaced_with(
                self.client.clone(),
                &self.namespace,
                &legacy_cronjob_resource(),
            );
            cronjobs
                .list(&lp)
                .await?
                .items
                .into_iter()
                .filter_map(|item| item.metadata.name)
                .collect::<Vec<_>>()
        };

        Ok(names)
    }

    /// Build a manual job from the cronjob job template
    pub fn build_manual_job(&self, cronjob: CronJobTemplate) -> Result<Job> {
        job::build_manual_job(&self.namespace, cronjob, &job::random_suffix())
    }
}
