//! Orchestration for the `config` delivery mode.
//!
//! Optionally rewrites the image references embedded in the config document,
//! then applies the whole document through the control plane. The document
//! overwrite happens only after parsing and patching succeeded; a file that
//! fails both parsers is left byte-identical on disk.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::core::image::ImageRule;
use crate::core::patch::ConfigDocument;
use crate::io::config_file::{read_document, write_document};
use crate::io::kubectl::ClusterControlPlane;

/// Inputs for one config-mode run.
#[derive(Debug)]
pub struct ApplyRequest<'a> {
    pub config_path: &'a Path,
    /// When set, rewrite matching image references before applying.
    pub rule: Option<ImageRule>,
    pub dry_run: bool,
}

/// Patch (if requested) and apply the config document.
///
/// Returns the terminal success message. On dry run the (possibly patched)
/// document text is printed after the apply, as the apply itself only
/// validated it.
#[instrument(skip_all, fields(config = %request.config_path.display(), dry_run = request.dry_run))]
pub fn apply_config<C: ClusterControlPlane>(
    control: &C,
    request: &ApplyRequest<'_>,
) -> Result<String> {
    if let Some(rule) = &request.rule {
        patch_config_file(request.config_path, rule)?;
    }

    control
        .apply_config(request.config_path, request.dry_run)
        .context("apply config")?;

    if request.dry_run {
        let contents = read_document(request.config_path)?;
        print!("{contents}");
    }

    Ok(format!(
        "Applied config {}.",
        request.config_path.display()
    ))
}

/// Rewrite every matching image reference in the document on disk.
///
/// Returns the number of rewritten references.
pub fn patch_config_file(path: &Path, rule: &ImageRule) -> Result<usize> {
    let text = read_document(path)?;
    let mut document = ConfigDocument::parse(&text)
        .with_context(|| format!("parse config file {}", path.display()))?;
    let replaced = document.patch_images(rule);
    write_document(path, &document.to_text()?)?;
    info!(replaced, path = %path.display(), "rewrote image references");
    Ok(replaced)
}
