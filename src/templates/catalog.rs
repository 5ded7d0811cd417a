//! Template discovery on disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// A template file found under the template directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    /// Path relative to the template directory, usable as a template name
    pub name: String,

    /// Full path on disk
    pub path: PathBuf,
}

/// Lists every `.yaml`/`.yml` file below `root`, sorted by name
///
/// A missing root yields an empty list.
pub fn list_templates(root: &Path) -> Result<Vec<TemplateEntry>> {
    let mut entries = Vec::new();
    if root.is_dir() {
        walk(root, root, &mut entries)?;
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn walk(root: &Path, dir: &Path, entries: &mut Vec<TemplateEntry>) -> Result<()> {
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk(root, &path, entries)?;
        } else if is_template_file(&path) {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            // Template names always use forward slashes
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(TemplateEntry { name, path });
        }
    }

    Ok(())
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "yaml" | "yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_nested_yaml_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ops/common")).unwrap();
        fs::write(dir.path().join("release.yaml"), "").unwrap();
        fs::write(dir.path().join("ops/setup.YML"), "").unwrap();
        fs::write(dir.path().join("ops/common/review.yml"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let names: Vec<_> = list_templates(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();

        assert_eq!(names, vec!["ops/common/review.yml", "ops/setup.YML", "release.yaml"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_templates(&dir.path().join("nope")).unwrap().is_empty());
    }
}
