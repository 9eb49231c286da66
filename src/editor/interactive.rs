use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use k8s_openapi::api::batch::v1::Job;
use tracing::debug;

use super::JobEditor;
use crate::document::codec::{self, Format};
use crate::terminal::Terminal;

/// An editor command line such as `code --wait`, the file is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    program: String,
    args: Vec<String>,
}

impl EditorCommand {
    fn command(&self, file: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(file);
        cmd
    }
}

impl FromStr for EditorCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace().map(str::to_owned);
        let program = words.next().ok_or_else(|| anyhow!("editor command is empty"))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Opens the rendered job in the operator's editor and waits for it to exit.
/// The edited file is not validated here.
pub struct InteractiveEditor {
    manifest: PathBuf,
    command: EditorCommand,
    terminal: PathBuf,
}

impl InteractiveEditor {
    pub fn new(manifest: PathBuf, command: EditorCommand, terminal: PathBuf) -> Self {
        Self {
            manifest,
            command,
            terminal,
        }
    }
}

impl JobEditor for InteractiveEditor {
    fn edit_job(&self, job: &Job) -> Result<()> {
        let manifest = codec::job_to_manifest(Format::from_path(&self.manifest), job)?;
        fs::write(&self.manifest, manifest)
            .with_context(|| format!("failed to write {}", self.manifest.display()))?;

        let terminal = Terminal::open(&self.terminal)
            .with_context(|| format!("failed to open terminal {}", self.terminal.display()))?;

        let mut cmd = self.command.command(&self.manifest);
        terminal.attach(&mut cmd)?;

        debug!(editor = %self.command, file = %self.manifest.display(), "launching editor");
        let status = cmd
            .status()
            .with_context(|| format!("failed to launch editor {:?}", self.command.program))?;

        if !status.success() {
            bail!("editor {:?} exited with {status}", self.command.program);
        }
        Ok(())
    }
}
