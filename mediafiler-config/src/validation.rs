use std::path::Path;

use crate::{loader::error::ConfigLoadError, models::Config};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Reject configurations the server cannot run with and collect warnings for
/// the ones it can run with but probably should not.
pub fn apply_guard_rails(config: &Config) -> Result<ConfigWarnings, ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();
    let media = &config.media;

    if media.roots.is_empty() {
        return Err(ConfigLoadError::NoRoots);
    }
    if media.suffixes.is_empty() {
        return Err(ConfigLoadError::NoSuffixes);
    }

    for root in &media.roots {
        if !root.is_dir() {
            warnings.push_with_hint(
                format!("media root {} is not an existing directory", root.display()),
                "The index will refuse to start until every root can be walked",
            );
        }
    }

    if let Some(archive_dir) = media.archive_dir() {
        if archive_dir.exists() && !archive_dir.is_dir() {
            return Err(ConfigLoadError::ArchiveDirNotDirectory {
                path: archive_dir.to_path_buf(),
            });
        }
        if !archive_dir.exists() {
            warnings.push_with_hint(
                format!("archive directory {} does not exist", archive_dir.display()),
                "It will be created at startup",
            );
        }
        if let Some(root) = media
            .roots
            .iter()
            .find(|root| is_within(archive_dir, root))
        {
            warnings.push_with_hint(
                format!(
                    "archive directory {} is inside media root {}",
                    archive_dir.display(),
                    root.display()
                ),
                "Archived files will show up in the listing again",
            );
        }
    }

    Ok(warnings)
}

fn is_within(path: &Path, root: &Path) -> bool {
    let canonical = |p: &Path| std::fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    canonical(path).starts_with(canonical(root))
}
