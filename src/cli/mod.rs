use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::{self, Colorize};
use inquire::{InquireError, Select};
use k8s_openapi::api::batch::v1::Job;
use tempfile::TempPath;
use tracing::debug;

use crate::document::codec;
use crate::editor::{EditStrategy, EditorCommand, JobEditor};
use crate::kube::KubeHandler;
use crate::terminal::DEFAULT_TTY;

mod confirm;
mod submit;

use confirm::ConfirmationGate;
use submit::Submission;

const CONFIRM_PROMPT: &str = "Do you want to create a job with the change you just made?";

const EXAMPLES: &str = r#"Examples:
  # Edit a job interactively in your editor
  kj namespace name

  # Apply a patch without opening an editor
  kj --patch-file=/path/to/patch.json namespace name

  # Path patch file format (JSON or YAML):
  # {
  #   "path": "spec.template.spec.containers[0].command",
  #   "value": ["python", "main.py", "--option", "hoge"]
  # }
  # Any other mapping is merged into the job, containers are matched by name."#;

#[derive(Parser)]
#[command(
    name = "kj",
    version,
    about = "Create a custom job from a cronjob template",
    after_help = EXAMPLES
)]
pub struct Cli {
    /// `namespace name`, `namespace/name` or `name` of the cronjob. Pick one interactively when omitted
    #[arg(value_name = "TARGET")]
    targets: Vec<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Filename to save the Job resource to
    #[arg(short = 'f', long)]
    filename: Option<PathBuf>,

    /// JSON or YAML patch applied to the job instead of opening an editor
    #[arg(long)]
    patch_file: Option<PathBuf>,

    /// Editor used to edit the job
    #[arg(long, env = "EDITOR", default_value = "vi")]
    editor: String,

    /// Print the job instead of creating it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Submitted,
    Canceled,
    DryRun,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Target {
    pub namespace: Option<String>,
    pub name: Option<String>,
}

/// Parse `namespace name`, `namespace/name` or `name`. No argument at all
/// leaves both unset.
pub fn parse_target(args: &[String]) -> Option<Target> {
    let target = |namespace: Option<&str>, name: &str| {
        let valid = !name.is_empty() && namespace.is_none_or(|ns| !ns.is_empty());
        valid.then(|| Target {
            namespace: namespace.map(str::to_owned),
            name: Some(name.to_owned()),
        })
    };

    match args {
        [] => Some(Target::default()),
        [namespace, name] => target(Some(namespace.as_str()), name.as_str()),
        [arg] => match arg.split('/').collect::<Vec<_>>().as_slice() {
            [name] => target(None, *name),
            [namespace, name] => target(Some(*namespace), *name),
            _ => None,
        },
        _ => None,
    }
}

/// Where the job manifest lives. Temporary manifests are removed on drop.
enum Manifest {
    Temporary(TempPath),
    Kept(PathBuf),
}

impl Manifest {
    fn create(filename: Option<&Path>) -> Result<Self> {
        match filename {
            Some(path) => Ok(Manifest::Kept(path.to_owned())),
            None => {
                let path = tempfile::Builder::new()
                    .prefix("kj.")
                    .suffix(".yaml")
                    .tempfile()
                    .context("failed to create temporary file")?
                    .into_temp_path();
                Ok(Manifest::Temporary(path))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            Manifest::Temporary(path) => path,
            Manifest::Kept(path) => path,
        }
    }
}

impl Cli {
    pub async fn run(&self) -> Result<Outcome> {
        let target = parse_target(&self.targets).ok_or_else(|| {
            anyhow!("arguments are invalid, expected `namespace name`, `namespace/name` or `name`")
        })?;
        let editor: EditorCommand = self.editor.parse()?;

        let kube_handler = KubeHandler::new(self.kubeconfig.as_deref(), target.namespace)
            .await
            .context("failed to connect kubernetes")?;

        let name = match target.name {
            Some(name) => name,
            None => match select_cronjob(&kube_handler).await? {
                Some(name) => name,
                None => return Ok(Outcome::Canceled),
            },
        };

        let cronjob = kube_handler.get_cronjob_template(&name).await?;
        let job = kube_handler.build_manual_job(cronjob)?;

        let manifest = Manifest::create(self.filename.as_deref())?;
        let strategy = EditStrategy::select(
            manifest.path().to_owned(),
            self.patch_file.clone(),
            editor,
            PathBuf::from(DEFAULT_TTY),
        );
        strategy.edit_job(&job)?;

        let content = review(manifest.path())?;
        if self.dry_run {
            print!("\n{content}");
            return Ok(Outcome::DryRun);
        }

        let terminal = if strategy.is_unattended() {
            None
        } else {
            let gate = ConfirmationGate::new(CONFIRM_PROMPT, DEFAULT_TTY);
            if !gate.confirm().await? {
                return Ok(Outcome::Canceled);
            }
            Some(PathBuf::from(DEFAULT_TTY))
        };

        Submission::new(self.kubeconfig.clone(), terminal).apply(manifest.path())?;
        Ok(Outcome::Submitted)
    }
}

async fn select_cronjob(kube_handler: &KubeHandler) -> Result<Option<String>> {
    let cronjobs = kube_handler.list_cronjob().await?;
    if cronjobs.is_empty() {
        bail!("no cronjob found in namespace {}", kube_handler.namespace());
    }

    match Select::new("Select the cronjob to create a job from", cronjobs).prompt() {
        Ok(name) => Ok(Some(name)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Decode the manifest as written by the editing strategy and print what is
/// about to be created. Returns the manifest content.
fn review(manifest: &Path) -> Result<String> {
    let content = fs::read_to_string(manifest)
        .with_context(|| format!("failed to read {}", manifest.display()))?;
    let job = codec::decode_job(&manifest.display().to_string(), content.as_bytes())?;
    debug!(file = %manifest.display(), "decoded edited job");

    print_summary(&job);
    Ok(content)
}

fn print_summary(job: &Job) {
    println!(
        "Job {} in namespace {}",
        job.metadata
            .name
            .as_deref()
            .unwrap_or_default()
            .truecolor(7, 174, 237)
            .bold(),
        job.metadata
            .namespace
            .as_deref()
            .unwrap_or_default()
            .truecolor(133, 59, 255)
            .bold()
    );

    let containers = job
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .map(|pod| pod.containers.as_slice())
        .unwrap_or_default();

    for container in containers {
        println!(
            "  {} {}",
            container.name.bold(),
            container.image.as_deref().unwrap_or("<no image>")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    fn target(namespace: Option<&str>, name: &str) -> Option<Target> {
        Some(Target {
            namespace: namespace.map(str::to_owned),
            name: Some(name.to_owned()),
        })
    }

    #[test]
    fn parse_target_forms() {
        let cases = [
            (args(&["namespace", "name"]), target(Some("namespace"), "name")),
            (args(&["namespace/name"]), target(Some("namespace"), "name")),
            (args(&["name"]), target(None, "name")),
            (args(&[]), Some(Target::default())),
            (args(&["namespace/name/hello"]), None),
            (args(&["namespace", "name", "hello"]), None),
            (args(&["namespace/"]), None),
            (args(&["/name"]), None),
            (args(&["", "name"]), None),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_target(&input), expected, "input {input:?}");
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from([
            "kj",
            "--patch-file=/tmp/patch.json",
            "-f",
            "job.yaml",
            "--editor",
            "nano -w",
            "ops/report",
        ])
        .unwrap();

        assert_eq!(cli.targets, vec!["ops/report"]);
        assert_eq!(cli.patch_file.as_deref(), Some(Path::new("/tmp/patch.json")));
        assert_eq!(cli.filename.as_deref(), Some(Path::new("job.yaml")));
        assert_eq!(cli.editor, "nano -w");
        assert!(!cli.dry_run);
    }

    #[test]
    fn temporary_manifest_is_removed() {
        let manifest = Manifest::create(None).unwrap();
        let path = manifest.path().to_owned();
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(file_name.starts_with("kj.") && file_name.ends_with(".yaml"));
        assert!(path.exists());
        drop(manifest);
        assert!(!path.exists());
    }

    #[test]
    fn review_rejects_broken_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("job.yaml");
        fs::write(&manifest, "metadata: [oops\n").unwrap();

        let err = review(&manifest).unwrap_err();
        assert!(err.to_string().contains("job.yaml"));
    }
}
