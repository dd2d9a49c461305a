use crate::error::{CodeGuardError, Result};
use crate::language::is_code_file;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Files above this size are not sent to the model.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Build and dependency manifests analyzed alongside source code.
const CONFIG_FILES: &[&str] = &[
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "build.xml",
    "ivy.xml",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "pipfile",
    "pipfile.lock",
    "composer.json",
    "composer.lock",
    "cargo.toml",
    "cargo.lock",
    "go.mod",
    "go.sum",
    "packages.config",
    "makefile",
    "cmakelists.txt",
    "vcpkg.json",
    "gemfile",
];

const CONFIG_SUFFIXES: &[&str] = &[".csproj", ".fsproj"];

const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "vendor", "dist", "build", "__pycache__"];

pub fn is_config_file(path: &Path) -> bool {
    let name = file_name_lower(path);
    CONFIG_FILES.contains(&name.as_str()) || CONFIG_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Test code is not scored: names mentioning test/spec/mock, or anything
/// under a `test`/`tests` directory.
pub fn is_test_path(path: &Path) -> bool {
    let name = file_name_lower(path);
    if name.contains("test") || name.contains("spec") || name.contains("mock") {
        return true;
    }
    path.parent()
        .map(|parent| {
            parent.components().any(|c| {
                let part = c.as_os_str().to_string_lossy().to_ascii_lowercase();
                part == "test" || part == "tests"
            })
        })
        .unwrap_or(false)
}

/// Whether `path` should be analyzed.
pub fn accepts(path: &Path) -> bool {
    (is_code_file(path) || is_config_file(path)) && !is_test_path(path)
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Expand the given files and directories into the ordered list of files to
/// analyze. Roots keep their given order; files found under a directory are
/// sorted. Duplicates are dropped.
pub fn discover_files(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for root in roots {
        if root.is_file() {
            if accepts(root) {
                push_if_small(root.clone(), &mut results);
            } else {
                tracing::debug!("skipping unsupported file {}", root.display());
            }
        } else if root.is_dir() {
            let mut found = Vec::new();
            walk_dir(root, &mut found)?;
            found.sort();
            for path in found {
                push_if_small(path, &mut results);
            }
        } else {
            return Err(CodeGuardError::PathNotFound(root.display().to_string()));
        }
    }

    let mut seen = HashSet::new();
    results.retain(|path| seen.insert(path.clone()));
    Ok(results)
}

fn push_if_small(path: PathBuf, results: &mut Vec<PathBuf>) {
    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_FILE_SIZE => {
            tracing::warn!(
                "skipping {} ({} bytes exceeds the {} byte limit)",
                path.display(),
                meta.len(),
                MAX_FILE_SIZE
            );
        }
        _ => results.push(path),
    }
}

fn walk_dir(dir: &Path, results: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if path.is_dir() {
            if name_str.starts_with('.') || SKIPPED_DIRS.contains(&name_str.as_ref()) {
                continue;
            }
            walk_dir(&path, results)?;
        } else if path.is_file() && accepts(&path) {
            results.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "content\n").unwrap();
        path
    }

    #[test]
    fn test_filters() {
        assert!(accepts(Path::new("src/UserService.java")));
        assert!(accepts(Path::new("pom.xml")));
        assert!(accepts(Path::new("Cargo.toml")));
        assert!(accepts(Path::new("app/App.csproj")));
        assert!(!accepts(Path::new("src/UserServiceTest.java")));
        assert!(!accepts(Path::new("src/user.spec.ts")));
        assert!(!accepts(Path::new("src/MockRepo.java")));
        assert!(!accepts(Path::new("src/test/java/Util.java")));
        assert!(!accepts(Path::new("notes.md")));
    }

    #[test]
    fn test_discover_walks_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/b/Zeta.java");
        touch(root, "src/a/Alpha.java");
        touch(root, "pom.xml");
        touch(root, "README.md");
        touch(root, "src/test/java/AlphaTest.java");
        touch(root, "node_modules/lib/index.js");
        touch(root, ".git/hooks/pre-commit.py");

        let files = discover_files(&[root.to_path_buf()]).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(rel, vec!["pom.xml", "src/a/Alpha.java", "src/b/Zeta.java"]);
    }

    #[test]
    fn test_discover_keeps_root_order_and_dedups() {
        let dir = TempDir::new().unwrap();
        let b = touch(dir.path(), "B.java");
        let a = touch(dir.path(), "A.java");

        let files = discover_files(&[b.clone(), a.clone(), b.clone()]).unwrap();
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn test_discover_skips_large_files() {
        let dir = TempDir::new().unwrap();
        let big = dir.path().join("Big.java");
        fs::write(&big, vec![b'x'; (MAX_FILE_SIZE + 1) as usize]).unwrap();
        touch(dir.path(), "Small.java");

        let files = discover_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Small.java"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_files(&[dir.path().join("absent")]).unwrap_err();
        assert!(matches!(err, CodeGuardError::PathNotFound(_)));
    }
}
