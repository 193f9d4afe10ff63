//! Output path validation for unpacked members.
//!
//! Member names come straight from the container, so a crafted archive can
//! carry names like `../x` or `/etc/x`. [`resolve_member_path`] decides where
//! a member may be written according to a [`PathSafety`] policy.

use std::path::{Component, Path, PathBuf};

use crate::container::MemberName;
use crate::{Error, Result};

/// Policy for turning member names into output paths.
///
/// # Examples
///
/// ```rust
/// use zpack::safety::PathSafety;
///
/// // Untrusted containers should use the default.
/// assert_eq!(PathSafety::default(), PathSafety::Strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSafety {
    /// The name must be a single plain file name.
    ///
    /// Rejects separators, `.`/`..`, and absolute or drive-prefixed names.
    #[default]
    Strict,
    /// The name may contain `/`-separated subdirectories.
    ///
    /// Every component must still be a plain name, so the result never
    /// leaves the output directory. Missing parent directories are created
    /// on extraction.
    Relaxed,
    /// The name is joined to the output directory unchanged.
    ///
    /// # Security Warning
    ///
    /// With this policy an absolute name replaces the output directory and
    /// `..` components walk out of it. Only use it for containers you built
    /// yourself.
    Disabled,
}

impl PathSafety {
    /// Parses a policy name (`strict`, `relaxed` or `disabled`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "relaxed" => Some(Self::Relaxed),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Resolves the output path for `name` inside `out_dir`.
///
/// # Errors
///
/// Returns [`Error::PathTraversal`] if the policy rejects the name.
///
/// # Examples
///
/// ```rust
/// use std::path::Path;
/// use zpack::MemberName;
/// use zpack::safety::{PathSafety, resolve_member_path};
///
/// let name = MemberName::new("page_1.cxml").unwrap();
/// let path = resolve_member_path(&name, Path::new("out"), PathSafety::Strict).unwrap();
/// assert_eq!(path, Path::new("out").join("page_1.cxml"));
///
/// let evil = MemberName::new("../page_1.cxml").unwrap();
/// assert!(resolve_member_path(&evil, Path::new("out"), PathSafety::Strict).is_err());
/// ```
pub fn resolve_member_path(
    name: &MemberName,
    out_dir: &Path,
    policy: PathSafety,
) -> Result<PathBuf> {
    let raw = name.as_bytes();
    let reject = || Error::PathTraversal {
        name: name.to_string_lossy().into_owned(),
    };

    match policy {
        PathSafety::Strict => {
            // Backslash is a separator on Windows; treat it as one everywhere.
            if raw.iter().any(|&b| b == b'/' || b == b'\\') {
                return Err(reject());
            }
            let path = native_path(name)?;
            if !is_plain(path) {
                return Err(reject());
            }
            Ok(out_dir.join(path))
        }
        PathSafety::Relaxed => {
            if raw.contains(&b'\\') || raw.split(|&b| b == b'/').any(<[u8]>::is_empty) {
                return Err(reject());
            }
            let path = native_path(name)?;
            if !is_plain(path) {
                return Err(reject());
            }
            Ok(out_dir.join(path))
        }
        PathSafety::Disabled => Ok(out_dir.join(native_path(name)?)),
    }
}

/// Unix paths are bytes, so any stored name maps to a file name as-is.
#[cfg(unix)]
fn native_path(name: &MemberName) -> Result<&Path> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Ok(Path::new(OsStr::from_bytes(name.as_bytes())))
}

#[cfg(not(unix))]
fn native_path(name: &MemberName) -> Result<&Path> {
    name.to_str()
        .map(Path::new)
        .ok_or_else(|| Error::InvalidMemberName {
            reason: format!("{name} is not valid UTF-8 on this platform"),
        })
}

fn is_plain(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(name: &str, policy: PathSafety) -> Result<PathBuf> {
        resolve_member_path(&MemberName::new(name).unwrap(), Path::new("out"), policy)
    }

    #[test]
    fn test_strict_accepts_plain_names() {
        assert_eq!(
            resolve("manifest.cxml", PathSafety::Strict).unwrap(),
            Path::new("out").join("manifest.cxml")
        );
    }

    #[test]
    fn test_strict_rejects() {
        for name in ["..", ".", "../x", "a/b", "/etc/x", "a\\b"] {
            let err = resolve(name, PathSafety::Strict).unwrap_err();
            assert!(err.is_security_error(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_relaxed_allows_subdirectories() {
        assert_eq!(
            resolve("pages/page_1.cxml", PathSafety::Relaxed).unwrap(),
            Path::new("out").join("pages/page_1.cxml")
        );
        for name in ["../x", "a/../b", "/abs", "a//b", "a/", "./a"] {
            assert!(resolve(name, PathSafety::Relaxed).is_err(), "{name}");
        }
    }

    #[test]
    fn test_disabled_joins_verbatim() {
        assert_eq!(
            resolve("../x", PathSafety::Disabled).unwrap(),
            Path::new("out").join("../x")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_resolves_from_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bytes = [0xF1, 0xF2, 0xF0, b'.', b'b', b'i', b'n'];
        let name = MemberName::from_bytes(&bytes).unwrap();
        let path = resolve_member_path(&name, Path::new("out"), PathSafety::Strict).unwrap();
        assert_eq!(path, Path::new("out").join(OsStr::from_bytes(&bytes)));

        let nested = MemberName::from_bytes(b"../\xF1").unwrap();
        let err = resolve_member_path(&nested, Path::new("out"), PathSafety::Relaxed).unwrap_err();
        match err {
            Error::PathTraversal { name } => assert_eq!(name, "../\u{FFFD}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PathSafety::from_name("Relaxed"), Some(PathSafety::Relaxed));
        assert_eq!(PathSafety::from_name("off"), None);
    }
}
