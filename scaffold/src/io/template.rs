//! Template materialization: copy a template tree, substitute placeholders,
//! render the chosen license.
//!
//! Placeholders are bare `PROJECT_*` tokens (e.g. `PROJECT_NAME`). Tokens
//! missing from the dictionary are left untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use regex::{Captures, Regex};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::core::plan::Dictionary;
use crate::io::files::copy_dir_recursive;

/// File name of the rendered license in the project root.
pub const LICENSE_FILE: &str = "LICENSE";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPROJECT_[A-Z_]+\b").expect("placeholder regex is valid"));

/// Template operations used by the provisioning pipeline.
///
/// Implementations must be `Sync`: placeholder rendering and license
/// materialization run concurrently.
pub trait TemplateEngine: Sync {
    /// Copy every file of the template at `src` into `dest`.
    fn copy_template(&self, src: &Path, dest: &Path) -> Result<()>;

    /// Replace placeholders in every text file below `dest`.
    fn render_placeholders(&self, dictionary: &Dictionary, dest: &Path) -> Result<()>;

    /// Render license `license_id` from `licenses_dir` into `dest/LICENSE`.
    fn materialize_license(
        &self,
        license_id: &str,
        dictionary: &Dictionary,
        licenses_dir: &Path,
        dest: &Path,
    ) -> Result<()>;
}

/// [`TemplateEngine`] working directly on the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplates;

impl TemplateEngine for FsTemplates {
    #[instrument(skip_all, fields(src = %src.display()))]
    fn copy_template(&self, src: &Path, dest: &Path) -> Result<()> {
        if !src.is_dir() {
            return Err(anyhow!("template directory {} not found", src.display()));
        }
        copy_dir_recursive(src, dest)
    }

    #[instrument(skip_all, fields(dest = %dest.display()))]
    fn render_placeholders(&self, dictionary: &Dictionary, dest: &Path) -> Result<()> {
        let walker = WalkDir::new(dest)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");
        let mut rewritten = 0usize;
        for entry in walker {
            let entry = entry.with_context(|| format!("walk {}", dest.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if rewrite_file(entry.path(), dictionary)? {
                rewritten += 1;
            }
        }
        debug!(rewritten, "placeholders rendered");
        Ok(())
    }

    #[instrument(skip_all, fields(license_id))]
    fn materialize_license(
        &self,
        license_id: &str,
        dictionary: &Dictionary,
        licenses_dir: &Path,
        dest: &Path,
    ) -> Result<()> {
        let source = find_license(licenses_dir, license_id)?;
        let text = fs::read_to_string(&source)
            .with_context(|| format!("read license {}", source.display()))?;
        let target = dest.join(LICENSE_FILE);
        fs::write(&target, render_text(&text, dictionary))
            .with_context(|| format!("write {}", target.display()))?;
        debug!(license = %source.display(), "license written");
        Ok(())
    }
}

/// Substitute known placeholders in `text`.
pub fn render_text(text: &str, dictionary: &Dictionary) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            dictionary
                .get(token)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

/// Returns true when the file was rewritten. Non-UTF-8 files and files that
/// vanished during the walk are skipped.
fn rewrite_file(path: &Path, dictionary: &Dictionary) -> Result<bool> {
    let text = match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => return Ok(false),
        },
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let rendered = render_text(&text, dictionary);
    if rendered == text {
        return Ok(false);
    }
    fs::write(path, rendered).with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

fn find_license(licenses_dir: &Path, license_id: &str) -> Result<std::path::PathBuf> {
    if license_id.is_empty() || license_id.contains(['/', '\\']) || license_id.starts_with('.') {
        return Err(anyhow!("invalid license id '{license_id}'"));
    }
    [license_id.to_string(), format!("{license_id}.txt")]
        .into_iter()
        .map(|name| licenses_dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            anyhow!(
                "license '{license_id}' not found in {}",
                licenses_dir.display()
            )
        })
}
