use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// translation between absolute filesystem paths and repo paths
///
/// paths under the home directory are stored beneath a placeholder made of
/// the home directory's parent (`/home/achin/.vimrc` -> `home/.vimrc`), so
/// the same repository can be checked against a differently named home.
/// everything else is stored with its leading separator stripped
/// (`/etc/hosts` -> `etc/hosts`).
///
/// absolute paths under the placeholder directory but outside home
/// (`/home/bob/x`) cannot be represented without colliding with home paths
/// and are rejected, which keeps the mapping a bijection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTranslator {
    home: PathBuf,
    home_parent: PathBuf,
    placeholder: String,
}

impl PathTranslator {
    /// build a translator, validating that the last segment of `home` is `user`
    pub fn new(home: impl AsRef<Path>, user: &str) -> Result<Self> {
        let invariant = || Error::ConfigInvariant {
            home: home.as_ref().to_path_buf(),
            user: user.to_string(),
        };

        let home_norm = normalize_path(home.as_ref()).map_err(|_| invariant())?;
        if home_norm.file_name().and_then(|n| n.to_str()) != Some(user) {
            return Err(invariant());
        }

        let home_parent = home_norm.parent().ok_or_else(invariant)?.to_path_buf();
        let placeholder = home_parent
            .strip_prefix("/")
            .ok()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .ok_or_else(invariant)?
            .to_string();

        Ok(Self {
            home: home_norm,
            home_parent,
            placeholder,
        })
    }

    /// repo path prefix standing in for the home directory's parent
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// map an absolute filesystem path to its repo path
    pub fn to_repo_path(&self, path: &Path) -> Result<String> {
        let normalized = normalize_path(path)?;

        let rest = if let Ok(rest) = normalized.strip_prefix(&self.home) {
            if rest.as_os_str().is_empty() {
                return Err(outside(path, "the home directory itself is not a file"));
            }
            let rest = rest
                .to_str()
                .ok_or_else(|| outside(path, "path is not valid UTF-8"))?;
            return Ok(format!("{}/{}", self.placeholder, rest));
        } else if normalized.starts_with(&self.home_parent) {
            return Err(outside(
                path,
                "path shares the home placeholder but is not under the home directory",
            ));
        } else {
            normalized.strip_prefix("/").unwrap_or(&normalized)
        };

        if rest.as_os_str().is_empty() {
            return Err(outside(path, "the filesystem root is not a file"));
        }
        rest.to_str()
            .map(str::to_string)
            .ok_or_else(|| outside(path, "path is not valid UTF-8"))
    }

    /// map a repo path back to the absolute filesystem path
    pub fn to_absolute_path(&self, repo_path: &str) -> Result<PathBuf> {
        validate_repo_path(repo_path)?;

        if repo_path == self.placeholder {
            return Err(outside(
                Path::new(repo_path),
                "the home placeholder names a directory, not a file",
            ));
        }

        match repo_path
            .strip_prefix(self.placeholder.as_str())
            .and_then(|r| r.strip_prefix('/'))
        {
            Some(rest) => Ok(self.home.join(rest)),
            None => Ok(Path::new("/").join(repo_path)),
        }
    }
}

/// lexically normalize an absolute path: drops `.`, resolves `..`, collapses separators
///
/// symlinks are not resolved; the tracked path is the one the user named.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    if !path.is_absolute() {
        return Err(outside(path, "path is not absolute"));
    }

    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
            Component::Prefix(_) => return Err(outside(path, "unsupported path prefix")),
        }
    }
    Ok(out)
}

/// a repo path is a relative, '/'-separated path without empty or dot segments
pub fn validate_repo_path(repo_path: &str) -> Result<()> {
    let bad = |reason| outside(Path::new(repo_path), reason);

    if repo_path.is_empty() {
        return Err(bad("empty repo path"));
    }
    if repo_path.starts_with('/') {
        return Err(bad("repo paths are relative"));
    }
    for segment in repo_path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\0') {
            return Err(bad("repo path has an empty or reserved segment"));
        }
    }
    Ok(())
}

fn outside(path: &Path, reason: &'static str) -> Error {
    Error::OutsideScope {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn achin() -> PathTranslator {
        PathTranslator::new("/home/achin", "achin").unwrap()
    }

    #[test]
    fn test_home_and_system_paths() {
        let t = achin();
        assert_eq!(t.placeholder(), "home");
        assert_eq!(t.to_repo_path(Path::new("/home/achin/foo")).unwrap(), "home/foo");
        assert_eq!(t.to_repo_path(Path::new("/etc/passwd")).unwrap(), "etc/passwd");
        assert_eq!(
            t.to_repo_path(Path::new("/home/achin/.config/nvim/init.lua")).unwrap(),
            "home/.config/nvim/init.lua"
        );
    }

    #[test]
    fn test_inverse() {
        let t = achin();
        assert_eq!(
            t.to_absolute_path("home/foo").unwrap(),
            PathBuf::from("/home/achin/foo")
        );
        assert_eq!(
            t.to_absolute_path("etc/passwd").unwrap(),
            PathBuf::from("/etc/passwd")
        );
        // only a full segment match selects the home placeholder
        assert_eq!(
            t.to_absolute_path("homework/notes").unwrap(),
            PathBuf::from("/homework/notes")
        );
    }

    #[test]
    fn test_normalization() {
        let t = achin();
        assert_eq!(
            t.to_repo_path(Path::new("/home/achin/./a//b/../c")).unwrap(),
            "home/a/c"
        );
        assert_eq!(
            t.to_repo_path(Path::new("/etc/../etc/hosts")).unwrap(),
            "etc/hosts"
        );
        assert_eq!(
            normalize_path(Path::new("/../x")).unwrap(),
            PathBuf::from("/x")
        );
    }

    #[test]
    fn test_rejects_unrepresentable_paths() {
        let t = achin();
        for p in ["/home/bob/.bashrc", "/home", "/home/achin", "/", "relative/path"] {
            assert!(
                matches!(t.to_repo_path(Path::new(p)), Err(Error::OutsideScope { .. })),
                "{} should be rejected",
                p
            );
        }
        // sibling with a shared name prefix is not under home but is under the placeholder
        assert!(t.to_repo_path(Path::new("/home/achinx/f")).is_err());
    }

    #[test]
    fn test_rejects_bad_repo_paths() {
        let t = achin();
        for p in ["", "/etc/passwd", "home", "a//b", "a/./b", "../etc", "a/"] {
            assert!(
                matches!(t.to_absolute_path(p), Err(Error::OutsideScope { .. })),
                "{:?} should be rejected",
                p
            );
        }
    }

    #[test]
    fn test_home_user_mismatch() {
        let result = PathTranslator::new("/home/renamed", "achin");
        assert!(matches!(result, Err(Error::ConfigInvariant { .. })));

        // home directly under the root leaves no placeholder
        let result = PathTranslator::new("/achin", "achin");
        assert!(matches!(result, Err(Error::ConfigInvariant { .. })));

        let result = PathTranslator::new("home/achin", "achin");
        assert!(matches!(result, Err(Error::ConfigInvariant { .. })));
    }

    #[test]
    fn test_nested_placeholder() {
        let t = PathTranslator::new("/var/lib/svc", "svc").unwrap();
        assert_eq!(t.placeholder(), "var/lib");
        assert_eq!(t.to_repo_path(Path::new("/var/lib/svc/rc")).unwrap(), "var/lib/rc");
        assert_eq!(t.to_repo_path(Path::new("/var/log/x")).unwrap(), "var/log/x");
        assert!(t.to_repo_path(Path::new("/var/lib/other")).is_err());
        assert_eq!(
            t.to_absolute_path("var/lib/rc").unwrap(),
            PathBuf::from("/var/lib/svc/rc")
        );
        assert_eq!(
            t.to_absolute_path("var/log/x").unwrap(),
            PathBuf::from("/var/log/x")
        );
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_.-]{1,8}".prop_filter("dot segments", |s| s != "." && s != "..")
    }

    proptest! {
        #[test]
        fn prop_home_roundtrip(segments in proptest::collection::vec(segment(), 1..5)) {
            let t = achin();
            let p = PathBuf::from("/home/achin").join(segments.join("/"));
            let repo = t.to_repo_path(&p).unwrap();
            prop_assert_eq!(t.to_absolute_path(&repo).unwrap(), normalize_path(&p).unwrap());
        }

        #[test]
        fn prop_system_roundtrip(segments in proptest::collection::vec(segment(), 1..5)) {
            let t = achin();
            prop_assume!(segments[0] != "home");
            let p = PathBuf::from("/").join(segments.join("/"));
            let repo = t.to_repo_path(&p).unwrap();
            prop_assert_eq!(t.to_absolute_path(&repo).unwrap(), normalize_path(&p).unwrap());
        }
    }
}
