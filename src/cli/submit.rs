use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::terminal::Terminal;

/// Hands the manifest to `kubectl apply`.
pub struct Submission {
    program: String,
    kubeconfig: Option<PathBuf>,
    terminal: Option<PathBuf>,
}

impl Submission {
    /// With a `terminal`, kubectl runs attached to it, otherwise it inherits our stdio.
    pub fn new(kubeconfig: Option<PathBuf>, terminal: Option<PathBuf>) -> Self {
        Self {
            program: "kubectl".to_owned(),
            kubeconfig,
            terminal,
        }
    }

    fn command(&self, manifest: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("apply").arg("-f").arg(manifest);
        if let Some(kubeconfig) = &self.kubeconfig {
            cmd.arg("--kubeconfig").arg(kubeconfig);
        }
        cmd
    }

    pub fn apply(&self, manifest: &Path) -> Result<()> {
        let mut cmd = self.command(manifest);

        // held until kubectl exits
        let terminal = match &self.terminal {
            Some(path) => {
                let terminal = Terminal::open(path)
                    .with_context(|| format!("failed to open terminal {}", path.display()))?;
                terminal.attach(&mut cmd)?;
                Some(terminal)
            }
            None => None,
        };

        debug!(command = ?cmd, "submitting job");
        let status = cmd
            .status()
            .with_context(|| format!("failed to run {}", self.program))?;
        drop(terminal);

        if !status.success() {
            bail!("{} apply exited with {status}", self.program);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(submission: &Submission) -> Vec<String> {
        submission
            .command(Path::new("/tmp/kj.job.yaml"))
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn apply_arguments() {
        let submission = Submission::new(None, None);
        assert_eq!(args(&submission), vec!["apply", "-f", "/tmp/kj.job.yaml"]);
    }

    #[test]
    fn explicit_kubeconfig_is_forwarded() {
        let submission = Submission::new(Some("/etc/kube/admin.conf".into()), None);
        assert_eq!(
            args(&submission),
            vec!["apply", "-f", "/tmp/kj.job.yaml", "--kubeconfig", "/etc/kube/admin.conf"]
        );
    }

    #[test]
    fn failing_command_is_an_error() {
        let submission = Submission {
            program: "false".to_owned(),
            kubeconfig: None,
            terminal: None,
        };
        let err = submission.apply(Path::new("/dev/null")).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
