use std::path::PathBuf;

use anyhow::Result;
use k8s_openapi::api::batch::v1::Job;
use tracing::info;

pub mod interactive;
pub mod patch_file;

pub use interactive::{EditorCommand, InteractiveEditor};
pub use patch_file::PatchFileEditor;

pub trait JobEditor {
    /// Write the job to its manifest file, changed by the operator or by a patch.
    fn edit_job(&self, job: &Job) -> Result<()>;
}

/// How the job is edited for this run. Chosen once, before any edit happens.
pub enum EditStrategy {
    Interactive(InteractiveEditor),
    PatchFile(PatchFileEditor),
}

impl EditStrategy {
    pub fn select(
        manifest: PathBuf,
        patch_file: Option<PathBuf>,
        editor: EditorCommand,
        terminal: PathBuf,
    ) -> Self {
        match patch_file {
            Some(patch_file) => {
                info!(patch_file = %patch_file.display(), "editing job with patch file");
                EditStrategy::PatchFile(PatchFileEditor::new(manifest, patch_file))
            }
            None => {
                info!(editor = %editor, "editing job interactively");
                EditStrategy::Interactive(InteractiveEditor::new(manifest, editor, terminal))
            }
        }
    }

    /// Patch-file runs need no operator: no editor session, no confirmation.
    pub fn is_unattended(&self) -> bool {
        matches!(self, EditStrategy::PatchFile(_))
    }
}

impl JobEditor for EditStrategy {
    fn edit_job(&self, job: &Job) -> Result<()> {
        match self {
            EditStrategy::Interactive(editor) => editor.edit_job(job),
            EditStrategy::PatchFile(editor) => editor.edit_job(job),
        }
    }
}
