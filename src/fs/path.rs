use std::fs;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use tracing::debug;

use crate::config::DEFAULT_MAX_SUGGESTIONS;
use crate::error::ValidationError;

/// Path normalization, validation, breadcrumbs and autocomplete.
///
/// Holds no file-system state; every call queries the host directly.
#[derive(Debug, Clone)]
pub struct PathService {
    max_suggestions: usize,
}

impl Default for PathService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUGGESTIONS)
    }
}

impl PathService {
    pub fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    /// Normalize user input relative to the process working directory.
    pub fn normalize(&self, input: &str) -> PathBuf {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        self.normalize_in(input, &base)
    }

    /// Normalize user input, resolving relative paths against `base`.
    ///
    /// Expands a leading `~`, then canonicalizes (following symlinks). If
    /// canonicalization fails the path is made absolute lexically instead.
    /// Never fails.
    pub fn normalize_in(&self, input: &str, base: &Path) -> PathBuf {
        let expanded = expand_home(input.trim());
        let joined = if expanded.is_absolute() {
            expanded
        } else {
            base.join(expanded)
        };
        match fs::canonicalize(&joined) {
            Ok(resolved) => resolved,
            Err(_) => lexical_clean(&joined),
        }
    }

    /// Check that `path` is an existing, listable directory.
    pub fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(ValidationError::NotADirectory);
        }
        let mut entries = fs::read_dir(path)?;
        if let Some(Err(e)) = entries.next() {
            return Err(e.into());
        }
        Ok(())
    }

    /// Root-to-leaf breadcrumb decomposition of `path`.
    ///
    /// The root segment is labelled with its full display form (`/` on Unix).
    pub fn components(&self, path: &Path) -> Vec<(String, PathBuf)> {
        let mut crumbs: Vec<(String, PathBuf)> = path
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| (display_name(p), p.to_path_buf()))
            .collect();
        crumbs.reverse();
        crumbs
    }

    /// Parent directory of `path`, or `None` when `path` is a root.
    pub fn parent(&self, path: &Path) -> Option<PathBuf> {
        match path.parent() {
            Some(parent) if parent != path && !parent.as_os_str().is_empty() => {
                Some(parent.to_path_buf())
            }
            _ => None,
        }
    }

    /// Completion candidates for a partially typed path.
    ///
    /// A trailing separator lists the named directory; otherwise the last
    /// segment is a case-sensitive prefix filter over its parent's listing.
    /// Directories carry a trailing separator. Access failures yield an
    /// empty list.
    pub fn autocomplete(&self, partial: &str, base: &Path) -> Vec<String> {
        if partial.trim().is_empty() {
            return Vec::new();
        }
        let expanded = expand_home(partial);
        let search_path = if expanded.is_absolute() {
            expanded
        } else {
            base.join(expanded)
        };

        let (dir, prefix) = if partial.ends_with(MAIN_SEPARATOR) || partial.ends_with('/') {
            (search_path, String::new())
        } else {
            let prefix = match search_path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => return Vec::new(),
            };
            match search_path.parent() {
                Some(parent) => (parent.to_path_buf(), prefix),
                None => return Vec::new(),
            }
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "autocomplete listing failed");
                return Vec::new();
            }
        };

        let mut matches: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.starts_with(&prefix).then(|| (name, entry.path()))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));

        matches
            .into_iter()
            .take(self.max_suggestions)
            .map(|(_, path)| {
                let mut s = path.to_string_lossy().to_string();
                if path.is_dir() {
                    s.push(MAIN_SEPARATOR);
                }
                s
            })
            .collect()
    }

    /// `path` relative to `base`, or the full path when it lies outside.
    pub fn relative_to(&self, path: &Path, base: &Path) -> String {
        match path.strip_prefix(base) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        }
    }
}

/// Dot-prefixed names are hidden.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Final component of `path`, or the whole path for roots.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn expand_home(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input
        .strip_prefix("~/")
        .or_else(|| input.strip_prefix(&format!("~{MAIN_SEPARATOR}")))
    {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

/// Resolve `.` and `..` without touching the file system.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` on a bare root is a no-op, which is what `/..` means.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        File::create(root.join("b.txt")).unwrap();
        fs::create_dir(root.join("big")).unwrap();
        File::create(root.join("other.rs")).unwrap();
        File::create(root.join("Bravo.md")).unwrap();
        (dir, root)
    }

    #[test]
    fn validate_existing_directory() {
        let (_dir, root) = setup();
        assert_eq!(PathService::default().validate(&root), Ok(()));
    }

    #[test]
    fn validate_regular_file_is_not_a_directory() {
        let (_dir, root) = setup();
        assert_eq!(
            PathService::default().validate(&root.join("b.txt")),
            Err(ValidationError::NotADirectory)
        );
    }

    #[test]
    fn validate_missing_path_is_not_found() {
        let (_dir, root) = setup();
        assert_eq!(
            PathService::default().validate(&root.join("nope")),
            Err(ValidationError::NotFound)
        );
    }

    #[test]
    fn normalize_resolves_dot_segments() {
        let (_dir, root) = setup();
        let svc = PathService::default();
        let input = format!("{}/big/../big/.", root.display());
        assert_eq!(svc.normalize(&input), root.join("big"));
    }

    #[test]
    fn normalize_relative_against_base() {
        let (_dir, root) = setup();
        assert_eq!(
            PathService::default().normalize_in("big", &root),
            root.join("big")
        );
    }

    #[test]
    fn normalize_missing_path_falls_back_to_lexical() {
        let (_dir, root) = setup();
        let svc = PathService::default();
        let got = svc.normalize_in("ghost/../phantom/./x", &root);
        assert_eq!(got, root.join("phantom").join("x"));
    }

    #[test]
    fn normalize_expands_home() {
        if let Some(home) = dirs::home_dir() {
            let svc = PathService::default();
            let got = svc.normalize_in("~/definitely-not-here-xyz", Path::new("/"));
            assert_eq!(got, lexical_clean(&home.join("definitely-not-here-xyz")));
        }
    }

    #[test]
    fn components_root_to_leaf() {
        let svc = PathService::default();
        let crumbs = svc.components(Path::new("/usr/local/bin"));
        let names: Vec<&str> = crumbs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["/", "usr", "local", "bin"]);
        assert_eq!(crumbs[2].1, PathBuf::from("/usr/local"));
    }

    #[test]
    fn components_of_root_is_single_crumb() {
        let crumbs = PathService::default().components(Path::new("/"));
        assert_eq!(crumbs, vec![("/".to_string(), PathBuf::from("/"))]);
    }

    #[test]
    fn parent_of_root_is_none() {
        let svc = PathService::default();
        assert_eq!(svc.parent(Path::new("/")), None);
        assert_eq!(svc.parent(Path::new("/tmp")), Some(PathBuf::from("/")));
    }

    #[test]
    fn autocomplete_prefix_filters_siblings() {
        let (_dir, root) = setup();
        let svc = PathService::default();
        let partial = format!("{}/b", root.display());
        let got = svc.autocomplete(&partial, Path::new("/"));
        assert_eq!(
            got,
            vec![
                format!("{}/b.txt", root.display()),
                format!("{}/big/", root.display()),
            ]
        );
    }

    #[test]
    fn autocomplete_is_case_sensitive() {
        let (_dir, root) = setup();
        let got = PathService::default().autocomplete("B", &root);
        assert_eq!(got, vec![format!("{}/Bravo.md", root.display())]);
    }

    #[test]
    fn autocomplete_trailing_separator_lists_directory() {
        let (_dir, root) = setup();
        File::create(root.join("big").join("inner.txt")).unwrap();
        let got = PathService::default().autocomplete("big/", &root);
        assert_eq!(got, vec![format!("{}/big/inner.txt", root.display())]);
    }

    #[test]
    fn autocomplete_respects_limit() {
        let dir = TempDir::new().unwrap();
        for i in 0..30 {
            File::create(dir.path().join(format!("f{i:02}"))).unwrap();
        }
        let got = PathService::new(20).autocomplete("f", dir.path());
        assert_eq!(got.len(), 20);
        assert!(got[0].ends_with("f00"));
    }

    #[test]
    fn autocomplete_missing_parent_is_empty() {
        let (_dir, root) = setup();
        let got = PathService::default().autocomplete("nowhere/x", &root);
        assert!(got.is_empty());
        assert!(PathService::default().autocomplete("   ", &root).is_empty());
    }

    #[test]
    fn hidden_detection() {
        assert!(is_hidden(Path::new("/a/.git")));
        assert!(!is_hidden(Path::new("/a/src")));
        assert!(!is_hidden(Path::new("/")));
    }

    #[test]
    fn relative_to_inside_and_outside() {
        let svc = PathService::default();
        assert_eq!(
            svc.relative_to(Path::new("/a/b/c"), Path::new("/a")),
            "b/c"
        );
        assert_eq!(svc.relative_to(Path::new("/x/y"), Path::new("/a")), "/x/y");
    }
}
