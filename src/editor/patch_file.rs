use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use k8s_openapi::api::batch::v1::Job;
use tracing::debug;

use super::JobEditor;
use crate::document::codec::{self, Format};
use crate::patch::{PatchDescriptor, load_patch_file};

/// Applies a patch file to the job without operator interaction.
pub struct PatchFileEditor {
    manifest: PathBuf,
    patch_file: PathBuf,
}

impl PatchFileEditor {
    pub fn new(manifest: PathBuf, patch_file: PathBuf) -> Self {
        Self {
            manifest,
            patch_file,
        }
    }
}

impl JobEditor for PatchFileEditor {
    fn edit_job(&self, job: &Job) -> Result<()> {
        let patch = load_patch_file(&self.patch_file).context("failed to load patch file")?;

        let mut document = codec::to_tree(job)?;
        let owner_references = document.take_owner_references();
        let patched = patch.apply(&document)?;

        if let PatchDescriptor::Path { path, .. } = &patch {
            debug!(%path, value = ?patched.lookup(path), "patched job document");
        }

        // rendered in full before the file is touched
        let manifest = codec::render_manifest(
            Format::from_path(&self.manifest),
            &patched,
            owner_references.as_ref(),
        )?;
        fs::write(&self.manifest, manifest)
            .with_context(|| format!("failed to write {}", self.manifest.display()))
    }
}
